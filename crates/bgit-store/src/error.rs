use bgit_repo::RepoError;
use bgit_types::ObjectId;

use crate::object::ObjectKind;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The object bytes could not be decoded (bad frame length, truncated
    /// tree record, bad mode width, malformed header block).
    #[error("malformed object: {0}")]
    Malformed(String),

    /// The frame's type tag is not blob, tree, commit or tag.
    #[error("unknown object type: {0}")]
    UnknownType(String),

    /// An object decoded fine but is not the kind the caller asked for.
    #[error("expected {expected}, got {actual}")]
    UnexpectedKind {
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// Repository layout error (including directory conflicts).
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
