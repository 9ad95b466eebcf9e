//! Error types for reference operations.

use bgit_repo::RepoError;
use bgit_store::StoreError;
use bgit_types::ObjectId;
use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// No reference or object matches the name.
    #[error("ref not found: {name}")]
    NotFound { name: String },

    /// More than one object matches the name. All candidates are listed.
    #[error("ambiguous reference {name}: {}", format_candidates(.candidates))]
    Ambiguous {
        name: String,
        candidates: Vec<ObjectId>,
    },

    /// The name is not an acceptable ref, branch, tag or remote name.
    #[error("invalid ref name: {name}: {reason}")]
    InvalidName { name: String, reason: String },

    /// The ref file exists but holds neither an ID nor `ref: <name>`.
    #[error("malformed ref {name}: {content:?}")]
    Malformed { name: String, content: String },

    /// Symbolic refs point at each other in a cycle (or too deep a chain).
    #[error("symbolic ref chain too deep starting at {name}")]
    SymbolicLoop { name: String },

    /// Writing the ref would turn a ref into a directory or vice versa.
    #[error("ref name conflict: {name} collides with {existing}")]
    NameConflict { name: String, existing: String },

    /// The object a name resolved to could not be read or followed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Repository layout error.
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// I/O error during file-based ref operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_candidates(candidates: &[ObjectId]) -> String {
    candidates
        .iter()
        .map(ObjectId::to_hex)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
