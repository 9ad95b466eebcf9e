use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Length of a raw digest in bytes.
pub const RAW_LEN: usize = 20;

/// Length of a digest in lowercase hex.
pub const HEX_LEN: usize = 40;

/// Shortest hex prefix accepted when disambiguating a user-supplied name.
pub const MIN_PREFIX_LEN: usize = 4;

/// Content-addressed identifier for any stored object.
///
/// An `ObjectId` is the SHA-1 of an object's canonical frame
/// (`type SP len NUL payload`). Identical content always produces the same
/// `ObjectId`, making objects deduplicatable and verifiable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; RAW_LEN]);

impl ObjectId {
    /// Create an `ObjectId` from a pre-computed hash.
    pub const fn from_raw(hash: [u8; RAW_LEN]) -> Self {
        Self(hash)
    }

    /// Create an `ObjectId` from a raw byte slice (tree and index records).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; RAW_LEN] = bytes.try_into().map_err(|_| TypeError::InvalidLength {
            expected: RAW_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// The null object ID (all zeros). Represents "no object".
    pub const fn null() -> Self {
        Self([0u8; RAW_LEN])
    }

    /// Returns `true` if this is the null object ID.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; RAW_LEN]
    }

    /// The raw 20-byte hash.
    pub fn as_bytes(&self) -> &[u8; RAW_LEN] {
        &self.0
    }

    /// Lowercase hex representation (40 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 7 characters).
    pub fn short_hex(&self) -> String {
        let mut s = self.to_hex();
        s.truncate(7);
        s
    }

    /// Parse from a full 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != HEX_LEN {
            return Err(TypeError::InvalidLength {
                expected: HEX_LEN,
                actual: s.len(),
            });
        }
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Split into the loose-object directory (2 hex chars) and file name
    /// (38 hex chars).
    pub fn loose_parts(&self) -> (String, String) {
        let hex = self.to_hex();
        let (dir, file) = hex.split_at(2);
        (dir.to_string(), file.to_string())
    }

    /// Returns `true` if the hex form of this ID begins with `prefix`
    /// (compared case-insensitively).
    pub fn starts_with_hex(&self, prefix: &str) -> bool {
        self.to_hex().starts_with(&prefix.to_ascii_lowercase())
    }
}

/// Returns `true` if `s` looks like an abbreviated or full digest:
/// 4 to 40 hex characters.
pub fn is_hex_prefix(s: &str) -> bool {
    (MIN_PREFIX_LEN..=HEX_LEN).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_hexdigit())
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; RAW_LEN]> for ObjectId {
    fn from(bytes: [u8; RAW_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectId> for [u8; RAW_LEN] {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}
