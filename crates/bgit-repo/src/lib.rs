//! Repository handle for bgit.
//!
//! A [`Repository`] is a pure path/context resolver: a worktree root, its
//! metadata directory (`.git`), and the parsed repository configuration. It
//! owns no caches. Every other layer receives it explicitly.
//!
//! # Modules
//!
//! - [`config`] -- INI-style `config` parsing and the format-version gate
//! - [`fs`] -- write-temp-then-rename file replacement
//! - [`repository`] -- open / create / discover and metadata path helpers
//! - [`error`] -- Error types for repository operations

pub mod config;
pub mod error;
pub mod fs;
pub mod repository;

pub use config::RepoConfig;
pub use error::{RepoError, RepoResult};
pub use fs::{write_atomic, write_new_atomic};
pub use repository::{Repository, METADATA_DIR, SUPPORTED_FORMAT_VERSION};
