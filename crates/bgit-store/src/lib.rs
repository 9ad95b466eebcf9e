//! Content-addressed object storage for bgit.
//!
//! This crate implements the object database under `.git/objects/`. Every
//! blob, tree, commit and tag is stored as an immutable, zlib-compressed
//! frame identified by the SHA-1 of its uncompressed form.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (file contents, arbitrary data)
//! - [`Tree`] -- directory listing of `(mode, name, id)` entries
//! - [`Commit`] / [`Tag`] -- header block plus message ([`Kvlm`])
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- one file per object at `objects/<2>/<38>`
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes are create-if-absent; an existing object file is trusted.
//! 3. An object file only appears at its final path once fully written.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod frame;
pub mod kvlm;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;
pub mod tree;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use frame::{decode_frame, encode_frame};
pub use kvlm::Kvlm;
pub use loose::{read_object, write_object, LooseObjectStore};
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, Object, ObjectKind, Tag};
pub use traits::ObjectStore;
pub use tree::{EntryMode, Tree, TreeEntry};
