use std::fmt;
use std::str::FromStr;

use bgit_crypto::digest_of;
use bgit_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::kvlm::Kvlm;
use crate::tree::Tree;

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Raw content (file contents, arbitrary data).
    Blob,
    /// Directory listing: ordered entries mapping names to object references.
    Tree,
    /// Snapshot pointer with parents, authorship and message.
    Commit,
    /// Annotated tag pointing at another object.
    Tag,
}

impl ObjectKind {
    /// The type tag written into the object frame.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            "tag" => Ok(Self::Tag),
            other => Err(StoreError::UnknownType(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Commit object: a [`Kvlm`] with `tree`, `parent`, `author`, `committer`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commit {
    pub kvlm: Kvlm,
}

impl Commit {
    pub fn new(kvlm: Kvlm) -> Self {
        Self { kvlm }
    }

    /// The root tree this commit snapshots.
    pub fn tree(&self) -> StoreResult<ObjectId> {
        let raw = self
            .kvlm
            .get(b"tree")
            .ok_or_else(|| StoreError::Malformed("commit has no tree header".into()))?;
        header_id(raw)
    }

    /// Parent commits in header order. Empty for a root commit.
    pub fn parents(&self) -> StoreResult<Vec<ObjectId>> {
        self.kvlm
            .get_all(b"parent")
            .iter()
            .map(|raw| header_id(raw))
            .collect()
    }

    /// The commit message.
    pub fn message(&self) -> &[u8] {
        self.kvlm.message()
    }
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// Annotated tag object: a [`Kvlm`] with `object`, `type`, `tag`, `tagger`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tag {
    pub kvlm: Kvlm,
}

impl Tag {
    pub fn new(kvlm: Kvlm) -> Self {
        Self { kvlm }
    }

    /// The tagged object.
    pub fn target(&self) -> StoreResult<ObjectId> {
        let raw = self
            .kvlm
            .get(b"object")
            .ok_or_else(|| StoreError::Malformed("tag has no object header".into()))?;
        header_id(raw)
    }

    /// The declared kind of the tagged object.
    pub fn target_kind(&self) -> StoreResult<ObjectKind> {
        let raw = self
            .kvlm
            .get(b"type")
            .ok_or_else(|| StoreError::Malformed("tag has no type header".into()))?;
        std::str::from_utf8(raw)
            .map_err(|_| StoreError::Malformed("tag type is not UTF-8".into()))?
            .parse()
    }
}

fn header_id(raw: &[u8]) -> StoreResult<ObjectId> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| ObjectId::from_hex(s).ok())
        .ok_or_else(|| {
            StoreError::Malformed(format!(
                "bad object id in header: {}",
                String::from_utf8_lossy(raw)
            ))
        })
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// Any stored object, tagged by kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl Object {
    /// The kind of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }

    /// Encode the payload (without frame header).
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Self::Blob(blob) => blob.data.clone(),
            Self::Tree(tree) => tree.serialize(),
            Self::Commit(commit) => commit.kvlm.serialize(),
            Self::Tag(tag) => tag.kvlm.serialize(),
        }
    }

    /// Decode a payload of the given kind.
    pub fn deserialize(kind: ObjectKind, data: &[u8]) -> StoreResult<Self> {
        Ok(match kind {
            ObjectKind::Blob => Self::Blob(Blob::new(data)),
            ObjectKind::Tree => Self::Tree(Tree::parse(data)?),
            ObjectKind::Commit => Self::Commit(Commit::new(Kvlm::parse(data)?)),
            ObjectKind::Tag => Self::Tag(Tag::new(Kvlm::parse(data)?)),
        })
    }

    /// Compute the content-addressed ID for this object.
    pub fn id(&self) -> ObjectId {
        digest_of(self.kind().as_str(), &self.serialize())
    }

    pub fn into_blob(self) -> StoreResult<Blob> {
        match self {
            Self::Blob(blob) => Ok(blob),
            other => Err(other.mismatch(ObjectKind::Blob)),
        }
    }

    pub fn into_tree(self) -> StoreResult<Tree> {
        match self {
            Self::Tree(tree) => Ok(tree),
            other => Err(other.mismatch(ObjectKind::Tree)),
        }
    }

    pub fn into_commit(self) -> StoreResult<Commit> {
        match self {
            Self::Commit(commit) => Ok(commit),
            other => Err(other.mismatch(ObjectKind::Commit)),
        }
    }

    pub fn into_tag(self) -> StoreResult<Tag> {
        match self {
            Self::Tag(tag) => Ok(tag),
            other => Err(other.mismatch(ObjectKind::Tag)),
        }
    }

    fn mismatch(&self, expected: ObjectKind) -> StoreError {
        StoreError::UnexpectedKind {
            expected,
            actual: self.kind(),
        }
    }
}

impl From<Blob> for Object {
    fn from(blob: Blob) -> Self {
        Self::Blob(blob)
    }
}

impl From<Tree> for Object {
    fn from(tree: Tree) -> Self {
        Self::Tree(tree)
    }
}

impl From<Commit> for Object {
    fn from(commit: Commit) -> Self {
        Self::Commit(commit)
    }
}

impl From<Tag> for Object {
    fn from(tag: Tag) -> Self {
        Self::Tag(tag)
    }
}
