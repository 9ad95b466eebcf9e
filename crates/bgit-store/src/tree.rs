//! Tree objects: ordered `(mode, name, id)` listings.
//!
//! Wire form per entry: `mode SP name NUL <20 raw digest bytes>`, with no
//! separator between entries.

use std::cmp::Ordering;

use bgit_types::{ObjectId, RAW_LEN};

use crate::error::{StoreError, StoreResult};
use crate::object::ObjectKind;

/// Classification of a tree entry's mode string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryMode {
    /// Subtree / directory (`040000`).
    Directory,
    /// Regular or executable file (`100644`, `100755`, ...).
    Regular,
    /// Symbolic link (`120000`); the blob holds the link target.
    Symlink,
    /// Submodule commit (`160000`).
    Submodule,
}

impl EntryMode {
    /// Classify a 5- or 6-character octal mode string by its type digits.
    pub fn classify(mode: &str) -> Option<Self> {
        match normalize_mode(mode).get(..2)? {
            "04" => Some(Self::Directory),
            "10" => Some(Self::Regular),
            "12" => Some(Self::Symlink),
            "16" => Some(Self::Submodule),
            _ => None,
        }
    }

    /// The kind of object an entry with this mode points at.
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Directory => ObjectKind::Tree,
            Self::Regular | Self::Symlink => ObjectKind::Blob,
            Self::Submodule => ObjectKind::Commit,
        }
    }

    /// The mode string git writes for this kind (regular files as `100644`).
    pub fn canonical(&self) -> &'static str {
        match self {
            Self::Directory => "40000",
            Self::Regular => "100644",
            Self::Symlink => "120000",
            Self::Submodule => "160000",
        }
    }
}

/// Left-pad a 5-character mode to 6 characters.
pub fn normalize_mode(mode: &str) -> String {
    format!("{mode:0>6}")
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// Octal mode string, exactly as parsed or constructed.
    pub mode: String,
    /// Entry name (a single path segment).
    pub name: String,
    /// Digest of the referenced object.
    pub id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(mode: impl Into<String>, name: impl Into<String>, id: ObjectId) -> Self {
        Self {
            mode: mode.into(),
            name: name.into(),
            id,
        }
    }

    /// The mode classification, if the mode is recognised.
    pub fn entry_mode(&self) -> Option<EntryMode> {
        EntryMode::classify(&self.mode)
    }

    /// Returns `true` if this entry is a subtree.
    pub fn is_dir(&self) -> bool {
        self.entry_mode() == Some(EntryMode::Directory)
    }

    /// Compare by name, treating directory names as if suffixed with `/`.
    pub fn cmp_tree_order(&self, other: &Self) -> Ordering {
        let a = self.name.as_bytes().iter().chain(self.dir_suffix());
        let b = other.name.as_bytes().iter().chain(other.dir_suffix());
        a.cmp(b)
    }

    fn dir_suffix(&self) -> &'static [u8] {
        if self.is_dir() {
            b"/"
        } else {
            b""
        }
    }
}

/// Directory listing object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    /// Entries in the order they were parsed or added.
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a tree with the given entries.
    ///
    /// Order does not matter: serialization always emits tree order.
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    /// Parse a tree payload.
    pub fn parse(raw: &[u8]) -> StoreResult<Self> {
        let mut entries = Vec::new();
        let mut pos = 0;
        while pos < raw.len() {
            let (next, entry) = parse_entry(raw, pos)?;
            entries.push(entry);
            pos = next;
        }
        Ok(Self { entries })
    }

    /// Serialize in tree order.
    pub fn serialize(&self) -> Vec<u8> {
        let mut sorted: Vec<&TreeEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.cmp_tree_order(b));

        let mut out = Vec::new();
        for entry in sorted {
            out.extend_from_slice(entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(entry.name.as_bytes());
            out.push(0);
            out.extend_from_slice(entry.id.as_bytes());
        }
        out
    }

    /// Sort entries into tree order in place.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.cmp_tree_order(b));
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_entry(raw: &[u8], start: usize) -> StoreResult<(usize, TreeEntry)> {
    let space = raw[start..]
        .iter()
        .position(|&b| b == b' ')
        .map(|p| p + start)
        .ok_or_else(|| StoreError::Malformed(format!("tree entry at {start}: missing mode")))?;

    let width = space - start;
    if width != 5 && width != 6 {
        return Err(StoreError::Malformed(format!(
            "tree entry at {start}: mode must be 5 or 6 characters, got {width}"
        )));
    }
    let mode = std::str::from_utf8(&raw[start..space])
        .map_err(|_| StoreError::Malformed(format!("tree entry at {start}: non-ASCII mode")))?;

    let nul = raw[space..]
        .iter()
        .position(|&b| b == 0)
        .map(|p| p + space)
        .ok_or_else(|| StoreError::Malformed(format!("tree entry at {start}: missing name terminator")))?;
    let name = std::str::from_utf8(&raw[space + 1..nul])
        .map_err(|_| StoreError::Malformed(format!("tree entry at {start}: name is not UTF-8")))?;

    let end = nul + 1 + RAW_LEN;
    let digest = raw
        .get(nul + 1..end)
        .ok_or_else(|| StoreError::Malformed(format!("tree entry at {start}: truncated digest")))?;
    let id = ObjectId::from_slice(digest)
        .map_err(|e| StoreError::Malformed(format!("tree entry at {start}: {e}")))?;

    Ok((end, TreeEntry::new(mode, name, id)))
}
