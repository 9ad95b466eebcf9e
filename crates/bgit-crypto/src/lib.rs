//! Content digests for bgit.
//!
//! Provides type-tagged SHA-1 hashing over the canonical object frame
//! `type SP decimal-length NUL payload`. The frame is what gets hashed and,
//! once compressed, what gets stored.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod hasher;

pub use hasher::{checksum, digest_of, frame, ContentHasher};
