use bgit_types::ObjectId;
use sha1::{Digest, Sha1};

/// Type-tagged SHA-1 content hasher.
///
/// Each hasher carries an object type tag (e.g. `"blob"`, `"commit"`) that
/// is written into the frame header ahead of the payload. A blob and a tree
/// with identical payload bytes therefore produce different digests.
pub struct ContentHasher {
    type_name: &'static str,
}

impl ContentHasher {
    /// Hasher for blob objects.
    pub const BLOB: Self = Self { type_name: "blob" };
    /// Hasher for tree objects.
    pub const TREE: Self = Self { type_name: "tree" };
    /// Hasher for commit objects.
    pub const COMMIT: Self = Self { type_name: "commit" };
    /// Hasher for annotated tag objects.
    pub const TAG: Self = Self { type_name: "tag" };

    /// Create a hasher with a custom type tag.
    pub const fn new(type_name: &'static str) -> Self {
        Self { type_name }
    }

    /// Hash a payload under this hasher's type tag.
    pub fn hash(&self, payload: &[u8]) -> ObjectId {
        digest_of(self.type_name, payload)
    }

    /// Build the uncompressed frame for a payload.
    pub fn frame(&self, payload: &[u8]) -> Vec<u8> {
        frame(self.type_name, payload)
    }

    /// Verify that a payload produces the expected object ID.
    pub fn verify(&self, payload: &[u8], expected: &ObjectId) -> bool {
        self.hash(payload) == *expected
    }

    /// The type tag used by this hasher.
    pub fn type_name(&self) -> &str {
        self.type_name
    }
}

/// Build the canonical frame `type SP len NUL payload`.
pub fn frame(type_name: &str, payload: &[u8]) -> Vec<u8> {
    let header = format!("{type_name} {}\0", payload.len());
    let mut full = Vec::with_capacity(header.len() + payload.len());
    full.extend_from_slice(header.as_bytes());
    full.extend_from_slice(payload);
    full
}

/// Digest of a typed payload: SHA-1 over its canonical frame.
pub fn digest_of(type_name: &str, payload: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(type_name.as_bytes());
    hasher.update(b" ");
    hasher.update(payload.len().to_string().as_bytes());
    hasher.update([0u8]);
    hasher.update(payload);
    let mut raw = [0u8; 20];
    raw.copy_from_slice(&hasher.finalize());
    ObjectId::from_raw(raw)
}

/// Plain SHA-1 of `data`, used for file trailers rather than object IDs.
pub fn checksum(data: &[u8]) -> [u8; 20] {
    let mut raw = [0u8; 20];
    raw.copy_from_slice(&Sha1::digest(data));
    raw
}
