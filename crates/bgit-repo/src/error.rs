//! Error types for repository operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while opening or laying out a repository.
#[derive(Debug, Error)]
pub enum RepoError {
    /// No metadata directory at (or above) the given path.
    #[error("not a repository: {0}")]
    NotARepository(PathBuf),

    /// The metadata directory exists but has no `config` file.
    #[error("configuration file missing: {0}")]
    MissingConfig(PathBuf),

    /// `core.repositoryformatversion` is not the supported value.
    #[error("unsupported repositoryformatversion: {0}")]
    UnsupportedFormatVersion(String),

    /// The `config` file could not be parsed.
    #[error("invalid config at line {line}: {reason}")]
    InvalidConfig { line: usize, reason: String },

    /// A path expected to be a directory is something else.
    #[error("not a directory: {0}")]
    DirectoryConflict(PathBuf),

    /// Refused to create a repository over existing metadata.
    #[error("{0} is not empty")]
    NotEmpty(PathBuf),

    /// I/O error from the filesystem.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RepoError {
    /// Returns `true` for the conditions that make a directory unusable as a
    /// repository (absent metadata, missing config, unsupported format).
    pub fn is_not_a_repository(&self) -> bool {
        matches!(
            self,
            Self::NotARepository(_) | Self::MissingConfig(_) | Self::UnsupportedFormatVersion(_)
        )
    }
}

/// Convenience alias for repository results.
pub type RepoResult<T> = Result<T, RepoError>;
