//! Reference management for bgit.
//!
//! References are the human-readable entry points into the object graph.
//! Each one is a small text file under the metadata directory holding either
//! a 40-hex object ID or `ref: <other ref name>`.
//!
//! - **Branches** (`refs/heads/*`) are mutable pointers to commits.
//! - **Tags** (`refs/tags/*`) name a commit or an annotated tag object.
//! - **Remote refs** (`refs/remotes/<remote>/*`) mirror branches elsewhere.
//! - **HEAD** is usually symbolic (`ref: refs/heads/master`) and detached
//!   when it holds an ID directly.
//!
//! # Modules
//!
//! - [`error`] -- Error types for ref operations
//! - [`types`] -- [`RefValue`], [`Head`] and the [`RefNode`] listing tree
//! - [`traits`] -- The [`RefStore`] trait, with resolution built on it
//! - [`names`] -- Ref, branch, tag and remote name validation
//! - [`file`] -- [`FileRefStore`], the on-disk store
//! - [`memory`] -- In-memory [`InMemoryRefStore`] for tests
//! - [`resolve`] -- Turning user-supplied names into object IDs

pub mod error;
pub mod file;
pub mod memory;
pub mod names;
pub mod resolve;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use file::FileRefStore;
pub use memory::InMemoryRefStore;
pub use names::{validate_branch_name, validate_ref_name, validate_remote_name, validate_tag_name};
pub use resolve::{find_object, resolve_candidates};
pub use traits::{RefStore, MAX_SYMREF_DEPTH};
pub use types::{Head, RefNode, RefTree, RefValue};
