//! Staging index for bgit.
//!
//! The index (`<git_dir>/index`) records the working-tree snapshot that the
//! next commit's tree is built from. It is a binary file in git's DIRC
//! version 2 layout and is always replaced as a whole.
//!
//! # Key Types
//!
//! - [`Index`] -- Ordered entries plus the binary codec and tree builder
//! - [`IndexEntry`] -- One tracked path with its stat data and blob ID
//! - [`FileType`] -- Regular file, symlink or gitlink

pub mod entry;
pub mod error;
pub mod index;

pub use entry::{FileType, IndexEntry, MAX_STAGE};
pub use error::{IndexError, IndexResult};
pub use index::{Index, INDEX_SIGNATURE, INDEX_VERSION};
