//! High-level SDK for bgit.
//!
//! [`Bgit`] bundles a repository with its loose object store and ref store
//! and exposes the plumbing operations on top of them. This is the main
//! entry point for applications embedding bgit.

pub mod error;
pub mod listing;
pub mod repository;

pub use error::{SdkError, SdkResult};
pub use listing::{LogEntry, TreeListing};
pub use repository::Bgit;

// Re-export key types
pub use bgit_index::{Index, IndexEntry};
pub use bgit_refs::{Head, RefStore, RefValue};
pub use bgit_store::{Blob, Commit, Kvlm, Object, ObjectKind, ObjectStore, Tag, Tree, TreeEntry};
pub use bgit_types::ObjectId;
