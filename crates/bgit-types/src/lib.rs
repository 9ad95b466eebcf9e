//! Foundation types for bgit.
//!
//! Every other bgit crate depends on `bgit-types`. It carries the one value
//! the whole system is keyed by: the 160-bit content digest of an object.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content-addressed identifier (SHA-1 of the object frame)
//! - [`TypeError`] -- Hex and length failures when parsing identifiers

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::{is_hex_prefix, ObjectId, HEX_LEN, MIN_PREFIX_LEN, RAW_LEN};
