//! Index entry types for tracking working-tree files.

use bgit_types::ObjectId;

/// Highest merge stage (`0` = merged, `1..=3` = base/ours/theirs).
pub const MAX_STAGE: u8 = 3;

/// Object type recorded in the high 4 bits of an entry's mode word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileType {
    /// `0b1000`
    Regular,
    /// `0b1010`
    Symlink,
    /// `0b1110`, a submodule commit.
    Gitlink,
}

impl FileType {
    /// Decode the 4-bit type tag.
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            0b1000 => Some(Self::Regular),
            0b1010 => Some(Self::Symlink),
            0b1110 => Some(Self::Gitlink),
            _ => None,
        }
    }

    /// The 4-bit type tag.
    pub fn bits(&self) -> u16 {
        match self {
            Self::Regular => 0b1000,
            Self::Symlink => 0b1010,
            Self::Gitlink => 0b1110,
        }
    }
}

/// An entry in the staging index, representing one tracked path.
///
/// Timestamps, device, inode and ids are carried as the 32-bit values the
/// file format stores; nothing here interprets them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// Metadata change time as `(seconds, nanoseconds)`.
    pub ctime: (u32, u32),
    /// Content modification time as `(seconds, nanoseconds)`.
    pub mtime: (u32, u32),
    pub dev: u32,
    pub ino: u32,
    pub file_type: FileType,
    /// Permission bits (`0o644`, `0o755`; `0` for symlinks and gitlinks).
    pub perms: u16,
    pub uid: u32,
    pub gid: u32,
    /// File size in bytes, truncated to 32 bits.
    pub size: u32,
    /// Blob (or gitlink commit) the path currently holds.
    pub id: ObjectId,
    pub assume_valid: bool,
    /// Merge stage, `0..=3`.
    pub stage: u8,
    /// Path relative to the worktree root, `/`-separated.
    pub name: String,
}

impl IndexEntry {
    /// A merged regular-file entry with zeroed stat data.
    pub fn new(name: impl Into<String>, id: ObjectId, size: u32) -> Self {
        Self {
            ctime: (0, 0),
            mtime: (0, 0),
            dev: 0,
            ino: 0,
            file_type: FileType::Regular,
            perms: 0o644,
            uid: 0,
            gid: 0,
            size,
            id,
            assume_valid: false,
            stage: 0,
            name: name.into(),
        }
    }

    /// The packed 16-bit mode word: type in the top 4 bits, then 9 permission bits.
    pub fn mode(&self) -> u16 {
        (self.file_type.bits() << 12) | (self.perms & 0o777)
    }

    /// The mode string a tree entry for this path carries, e.g. `100644`.
    pub fn tree_mode(&self) -> String {
        format!("{:o}", self.mode())
    }

    /// Whether this entry is merged (stage 0).
    pub fn is_merged(&self) -> bool {
        self.stage == 0
    }
}
