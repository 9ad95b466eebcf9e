//! Error types for the index crate.

use bgit_repo::RepoError;
use bgit_store::StoreError;

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The file does not start with `DIRC`.
    #[error("bad index signature: {0:?}")]
    BadSignature([u8; 4]),

    /// The header declares a version other than 2.
    #[error("unsupported index version: {0}")]
    UnsupportedVersion(u32),

    /// The file ends in the middle of a header or record.
    #[error("truncated index: needed {needed} bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    /// A record decoded but violates the format.
    #[error("invalid index entry at offset {offset}: {reason}")]
    InvalidEntry { offset: usize, reason: String },

    /// The trailing SHA-1 does not match the file contents.
    #[error("index checksum mismatch")]
    ChecksumMismatch,

    /// The path has no entry in the index.
    #[error("path not found in index: {0}")]
    PathNotFound(String),

    /// A path cannot be turned into a tree (empty segment, file/directory clash).
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The entry is still at a merge stage and cannot be written to a tree.
    #[error("unresolved conflict at path: {0}")]
    UnresolvedConflict(String),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Repository layout error.
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
