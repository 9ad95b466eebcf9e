//! The [`Index`]: ordered entries, the DIRC codec, and tree building.
//!
//! File layout (all integers big-endian):
//!
//! ```text
//! "DIRC" | version: u32 = 2 | count: u32
//! count × {
//!     ctime s,ns | mtime s,ns | dev | ino          (6 × u32)
//!     0u16 | mode u16 (type:4, unused:3, perms:9)
//!     uid | gid | size                             (3 × u32)
//!     id (20 raw bytes)
//!     flags u16 (assume-valid:1, extended:1, stage:2, name-len:12)
//!     name | NUL | zero padding to a multiple of 8
//! }
//! [extensions] | SHA-1 of everything above
//! ```

use std::fs;

use bgit_repo::{write_atomic, Repository};
use bgit_store::{EntryMode, Object, ObjectStore, Tree, TreeEntry};
use bgit_types::{ObjectId, RAW_LEN};
use bytes::{Buf, BufMut, BytesMut};
use tracing::debug;

use crate::entry::{FileType, IndexEntry, MAX_STAGE};
use crate::error::{IndexError, IndexResult};

/// Magic bytes at the start of every index file.
pub const INDEX_SIGNATURE: &[u8; 4] = b"DIRC";

/// The only index version read or written.
pub const INDEX_VERSION: u32 = 2;

const HEADER_LEN: usize = 12;
const FIXED_LEN: usize = 62;
const CHECKSUM_LEN: usize = 20;

const FLAG_ASSUME_VALID: u16 = 0x8000;
const FLAG_EXTENDED: u16 = 0x4000;
const NAME_MASK: u16 = 0x0FFF;

/// The staging index.
///
/// Entries are kept sorted by `(name, stage)` when edited through
/// [`add`](Self::add). Decoding keeps whatever order the file has.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Index {
    entries: Vec<IndexEntry>,
}

impl Index {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `<git_dir>/index`. A missing file is an empty index.
    pub fn read(repo: &Repository) -> IndexResult<Self> {
        let path = repo.path(&["index"]);
        if !path.exists() {
            debug!("no index file; starting empty");
            return Ok(Self::new());
        }
        let index = Self::from_bytes(&fs::read(&path)?)?;
        debug!(entries = index.len(), "read index");
        Ok(index)
    }

    /// Replace `<git_dir>/index` with this index.
    pub fn write(&self, repo: &Repository) -> IndexResult<()> {
        write_atomic(&repo.path(&["index"]), &self.to_bytes())?;
        debug!(entries = self.len(), "wrote index");
        Ok(())
    }

    /// Decode an index file.
    ///
    /// A trailing checksum is verified when present; files that end right
    /// after the last record are accepted as well.
    pub fn from_bytes(data: &[u8]) -> IndexResult<Self> {
        let mut buf = data;
        need(data, buf, HEADER_LEN)?;

        let mut signature = [0u8; 4];
        buf.copy_to_slice(&mut signature);
        if &signature != INDEX_SIGNATURE {
            return Err(IndexError::BadSignature(signature));
        }
        let version = buf.get_u32();
        if version != INDEX_VERSION {
            return Err(IndexError::UnsupportedVersion(version));
        }
        let count = buf.get_u32() as usize;

        let mut entries = Vec::with_capacity(count.min(buf.remaining() / FIXED_LEN));
        for _ in 0..count {
            entries.push(read_entry(data, &mut buf)?);
        }
        verify_trailer(data, buf)?;

        Ok(Self { entries })
    }

    /// Encode as a complete index file, checksum included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.entries.len() * 80 + CHECKSUM_LEN);
        buf.put_slice(INDEX_SIGNATURE);
        buf.put_u32(INDEX_VERSION);
        buf.put_u32(self.entries.len() as u32);

        for entry in &self.entries {
            buf.put_u32(entry.ctime.0);
            buf.put_u32(entry.ctime.1);
            buf.put_u32(entry.mtime.0);
            buf.put_u32(entry.mtime.1);
            buf.put_u32(entry.dev);
            buf.put_u32(entry.ino);
            buf.put_u16(0);
            buf.put_u16(entry.mode());
            buf.put_u32(entry.uid);
            buf.put_u32(entry.gid);
            buf.put_u32(entry.size);
            buf.put_slice(entry.id.as_bytes());

            let name = entry.name.as_bytes();
            let mut flags = (u16::from(entry.stage.min(MAX_STAGE)) << 12)
                | name.len().min(NAME_MASK as usize) as u16;
            if entry.assume_valid {
                flags |= FLAG_ASSUME_VALID;
            }
            buf.put_u16(flags);
            buf.put_slice(name);
            buf.put_u8(0);
            buf.put_bytes(0, padding(FIXED_LEN + name.len() + 1));
        }

        let sum = bgit_crypto::checksum(&buf);
        buf.put_slice(&sum);
        buf.to_vec()
    }

    /// Number of entries in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// The merged (stage 0) entry for `name`.
    pub fn get(&self, name: &str) -> Option<&IndexEntry> {
        self.get_stage(name, 0)
    }

    /// The entry for `name` at a specific merge stage.
    pub fn get_stage(&self, name: &str, stage: u8) -> Option<&IndexEntry> {
        self.entries
            .iter()
            .find(|e| e.name == name && e.stage == stage)
    }

    /// Add or replace an entry, keeping `(name, stage)` order.
    ///
    /// Adding a merged entry drops any conflict stages for the same path,
    /// and adding a conflict stage drops the merged entry.
    pub fn add(&mut self, entry: IndexEntry) -> IndexResult<()> {
        if entry.name.is_empty() || entry.name.contains('\0') {
            return Err(IndexError::InvalidPath(entry.name));
        }
        if entry.stage > MAX_STAGE {
            return Err(IndexError::InvalidEntry {
                offset: 0,
                reason: format!("stage {} out of range for {}", entry.stage, entry.name),
            });
        }

        let merged = entry.is_merged();
        self.entries
            .retain(|e| e.name != entry.name || e.is_merged() == merged);

        let found = self
            .entries
            .binary_search_by(|e| sort_key(e).cmp(&sort_key(&entry)));
        match found {
            Ok(pos) => self.entries[pos] = entry,
            Err(pos) => self.entries.insert(pos, entry),
        }
        Ok(())
    }

    /// Remove every stage of `name`, returning what was removed.
    pub fn remove(&mut self, name: &str) -> IndexResult<Vec<IndexEntry>> {
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.entries).into_iter().partition(|e| e.name == name);
        self.entries = kept;
        if removed.is_empty() {
            return Err(IndexError::PathNotFound(name.to_string()));
        }
        Ok(removed)
    }

    /// Paths that still carry conflict stages.
    pub fn conflicts(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entries
            .iter()
            .filter(|e| !e.is_merged())
            .map(|e| e.name.as_str())
            .collect();
        names.dedup();
        names
    }

    /// Write the merged entries as nested tree objects and return the root.
    ///
    /// Paths are visited in byte order so every directory's entries are
    /// contiguous; a directory is written as soon as the walk leaves it.
    /// Nesting depth is bounded only by memory.
    pub fn write_tree(&self, store: &dyn ObjectStore) -> IndexResult<ObjectId> {
        if let Some(name) = self.conflicts().first() {
            return Err(IndexError::UnresolvedConflict(name.to_string()));
        }

        let mut sorted: Vec<&IndexEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

        let mut builder = TreeBuilder::default();
        for entry in sorted {
            builder.add(entry, store)?;
        }
        let id = builder.finish(store)?;
        debug!(root = %id.short_hex(), entries = self.len(), "wrote tree from index");
        Ok(id)
    }

    /// Build an index holding every file reachable from `tree_id`.
    ///
    /// Stat fields are zeroed; sizes come from the blobs.
    pub fn from_tree(store: &dyn ObjectStore, tree_id: &ObjectId) -> IndexResult<Self> {
        let mut index = Self::new();
        let mut pending = vec![(*tree_id, String::new())];
        while let Some((id, prefix)) = pending.pop() {
            let tree = store.read(&id)?.into_tree()?;
            for item in tree.entries {
                let name = format!("{prefix}{}", item.name);
                let mut entry = IndexEntry::new(name.as_str(), item.id, 0);
                match item.entry_mode() {
                    Some(EntryMode::Directory) => {
                        pending.push((item.id, format!("{name}/")));
                        continue;
                    }
                    Some(EntryMode::Regular) => {
                        entry.perms = u16::from_str_radix(&item.mode, 8).unwrap_or(0o644) & 0o777;
                        entry.size = store.read(&item.id)?.serialize().len() as u32;
                    }
                    Some(EntryMode::Symlink) => {
                        entry.file_type = FileType::Symlink;
                        entry.perms = 0;
                        entry.size = store.read(&item.id)?.serialize().len() as u32;
                    }
                    Some(EntryMode::Submodule) => {
                        entry.file_type = FileType::Gitlink;
                        entry.perms = 0;
                    }
                    None => return Err(IndexError::InvalidPath(format!("{name}: mode {}", item.mode))),
                }
                index.add(entry)?;
            }
        }
        Ok(index)
    }
}

fn sort_key(entry: &IndexEntry) -> (&[u8], u8) {
    (entry.name.as_bytes(), entry.stage)
}

/// Zero bytes needed to round `len` up to a multiple of 8.
fn padding(len: usize) -> usize {
    (8 - len % 8) % 8
}

fn offset(data: &[u8], rest: &[u8]) -> usize {
    data.len() - rest.len()
}

fn need(data: &[u8], rest: &[u8], needed: usize) -> IndexResult<()> {
    if rest.remaining() < needed {
        return Err(IndexError::Truncated {
            offset: offset(data, rest),
            needed,
        });
    }
    Ok(())
}

fn invalid(offset: usize, reason: impl Into<String>) -> IndexError {
    IndexError::InvalidEntry {
        offset,
        reason: reason.into(),
    }
}

fn read_entry(data: &[u8], buf: &mut &[u8]) -> IndexResult<IndexEntry> {
    let start = offset(data, buf);
    need(data, buf, FIXED_LEN)?;

    let ctime = (buf.get_u32(), buf.get_u32());
    let mtime = (buf.get_u32(), buf.get_u32());
    let dev = buf.get_u32();
    let ino = buf.get_u32();

    if buf.get_u16() != 0 {
        return Err(invalid(start, "reserved mode bits are set"));
    }
    let mode = buf.get_u16();
    let file_type = FileType::from_bits(mode >> 12)
        .ok_or_else(|| invalid(start, format!("unknown file type {:#06b}", mode >> 12)))?;
    let perms = mode & 0o777;

    let uid = buf.get_u32();
    let gid = buf.get_u32();
    let size = buf.get_u32();

    let mut raw = [0u8; RAW_LEN];
    buf.copy_to_slice(&mut raw);

    let flags = buf.get_u16();
    if flags & FLAG_EXTENDED != 0 {
        return Err(invalid(start, "extended flags are not supported"));
    }
    let assume_valid = flags & FLAG_ASSUME_VALID != 0;
    let stage = ((flags >> 12) & 0b11) as u8;
    let declared = (flags & NAME_MASK) as usize;

    let rest: &[u8] = *buf;
    let name_len = if declared < NAME_MASK as usize {
        need(data, rest, declared + 1)?;
        if rest[declared] != 0 {
            return Err(invalid(start, "name is not NUL-terminated"));
        }
        declared
    } else {
        // Saturated length: the NUL is the only terminator.
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| invalid(start, "name is not NUL-terminated"))?;
        debug!(len, "long index entry name");
        len
    };
    let name = std::str::from_utf8(&rest[..name_len])
        .map_err(|_| invalid(start, "name is not UTF-8"))?
        .to_string();
    buf.advance(name_len + 1);

    let pad = padding(FIXED_LEN + name_len + 1);
    need(data, buf, pad)?;
    buf.advance(pad);

    Ok(IndexEntry {
        ctime,
        mtime,
        dev,
        ino,
        file_type,
        perms,
        uid,
        gid,
        size,
        id: ObjectId::from_raw(raw),
        assume_valid,
        stage,
        name,
    })
}

fn verify_trailer(data: &[u8], rest: &[u8]) -> IndexResult<()> {
    if rest.is_empty() {
        return Ok(());
    }
    need(data, rest, CHECKSUM_LEN)?;
    let (body, sum) = data.split_at(data.len() - CHECKSUM_LEN);
    if bgit_crypto::checksum(body) != sum {
        return Err(IndexError::ChecksumMismatch);
    }
    let extensions = rest.len() - CHECKSUM_LEN;
    if extensions > 0 {
        debug!(bytes = extensions, "ignoring index extensions");
    }
    Ok(())
}

/// Directories currently being filled while building trees, root first.
///
/// Entries must arrive in byte order of their full path.
#[derive(Default)]
struct TreeBuilder {
    root: Vec<TreeEntry>,
    open: Vec<(String, Vec<TreeEntry>)>,
}

impl TreeBuilder {
    fn add(&mut self, entry: &IndexEntry, store: &dyn ObjectStore) -> IndexResult<()> {
        let bad_path = || IndexError::InvalidPath(entry.name.clone());
        let (dirs, file): (Vec<&str>, &str) = match entry.name.rsplit_once('/') {
            Some((dirs, file)) => (dirs.split('/').collect(), file),
            None => (Vec::new(), entry.name.as_str()),
        };
        if file.is_empty() || dirs.iter().any(|d| d.is_empty()) {
            return Err(bad_path());
        }

        let shared = self
            .open
            .iter()
            .zip(&dirs)
            .take_while(|(open, dir)| open.0 == **dir)
            .count();
        while self.open.len() > shared {
            self.close(store)?;
        }
        for dir in &dirs[shared..] {
            if self.top().iter().any(|e| e.name == *dir) {
                return Err(bad_path());
            }
            self.open.push((dir.to_string(), Vec::new()));
        }

        let top = self.top();
        // Byte order puts a duplicate path right after its twin.
        if top.last().is_some_and(|e| e.name == file) {
            return Err(bad_path());
        }
        top.push(TreeEntry::new(entry.tree_mode(), file, entry.id));
        Ok(())
    }

    fn top(&mut self) -> &mut Vec<TreeEntry> {
        match self.open.last_mut() {
            Some((_, entries)) => entries,
            None => &mut self.root,
        }
    }

    /// Write the innermost open directory and record it in its parent.
    fn close(&mut self, store: &dyn ObjectStore) -> IndexResult<()> {
        if let Some((name, entries)) = self.open.pop() {
            let id = store.write(&Object::from(Tree::new(entries)))?;
            self.top()
                .push(TreeEntry::new(EntryMode::Directory.canonical(), name, id));
        }
        Ok(())
    }

    fn finish(mut self, store: &dyn ObjectStore) -> IndexResult<ObjectId> {
        while !self.open.is_empty() {
            self.close(store)?;
        }
        Ok(store.write(&Object::from(Tree::new(self.root)))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgit_store::{Blob, InMemoryObjectStore, LooseObjectStore};
    use proptest::prelude::*;

    fn id(byte: u8) -> ObjectId {
        ObjectId::from_raw([byte; RAW_LEN])
    }

    fn sample() -> Index {
        let mut index = Index::new();
        let mut a = IndexEntry::new("README", id(1), 6);
        a.ctime = (1_700_000_000, 12);
        a.mtime = (1_700_000_001, 34);
        a.dev = 2049;
        a.ino = 131_072;
        a.uid = 1000;
        a.gid = 1000;
        index.add(a).unwrap();

        let mut b = IndexEntry::new("bin/run.sh", id(2), 120);
        b.perms = 0o755;
        b.assume_valid = true;
        index.add(b).unwrap();

        let mut c = IndexEntry::new("link", id(3), 4);
        c.file_type = FileType::Symlink;
        c.perms = 0;
        index.add(c).unwrap();
        index
    }

    #[test]
    fn empty_index_encoding() {
        let bytes = Index::new().to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN + CHECKSUM_LEN);
        assert_eq!(&bytes[..12], b"DIRC\x00\x00\x00\x02\x00\x00\x00\x00");
        assert!(Index::from_bytes(&bytes).unwrap().is_empty());
    }

    #[test]
    fn decode_preserves_entries_and_order() {
        let index = sample();
        let decoded = Index::from_bytes(&index.to_bytes()).unwrap();
        assert_eq!(decoded, index);
        let names: Vec<&str> = decoded.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["README", "bin/run.sh", "link"]);
    }

    #[test]
    fn records_are_eight_byte_aligned() {
        let mut index = Index::new();
        // 62 + 1 + 1 = 64: no padding.
        index.add(IndexEntry::new("a", id(1), 0)).unwrap();
        assert_eq!(index.to_bytes().len(), HEADER_LEN + 64 + CHECKSUM_LEN);

        // 62 + 2 + 1 = 65: padded to 72.
        let mut index = Index::new();
        index.add(IndexEntry::new("ab", id(1), 0)).unwrap();
        let bytes = index.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN + 72 + CHECKSUM_LEN);
        assert!(bytes[HEADER_LEN + 64..HEADER_LEN + 72].iter().all(|&b| b == 0));
    }

    #[test]
    fn flag_and_mode_words() {
        let mut entry = IndexEntry::new("abc", id(9), 0);
        entry.stage = 2;
        entry.assume_valid = true;
        let mut index = Index::new();
        index.add(entry).unwrap();
        let bytes = index.to_bytes();

        assert_eq!(&bytes[36..38], &[0, 0]);
        assert_eq!(u16::from_be_bytes([bytes[38], bytes[39]]), 0o100644);
        assert_eq!(u16::from_be_bytes([bytes[72], bytes[73]]), 0x8000 | 0x2000 | 3);

        let back = Index::from_bytes(&bytes).unwrap();
        let entry = back.get_stage("abc", 2).unwrap();
        assert!(entry.assume_valid);
        assert!(back.get("abc").is_none());
    }

    #[test]
    fn long_names_scan_for_terminator() {
        let name = "d/".repeat(2100) + "file";
        let mut index = Index::new();
        index.add(IndexEntry::new(name.clone(), id(4), 1)).unwrap();
        let bytes = index.to_bytes();
        assert_eq!(u16::from_be_bytes([bytes[72], bytes[73]]) & NAME_MASK, NAME_MASK);

        let back = Index::from_bytes(&bytes).unwrap();
        assert_eq!(back.entries()[0].name, name);
    }

    #[test]
    fn bad_signature() {
        let mut bytes = Index::new().to_bytes();
        bytes[..4].copy_from_slice(b"CRID");
        assert!(matches!(
            Index::from_bytes(&bytes),
            Err(IndexError::BadSignature(sig)) if &sig == b"CRID"
        ));
    }

    #[test]
    fn unsupported_version() {
        let mut bytes = Index::new().to_bytes();
        bytes[7] = 3;
        assert!(matches!(
            Index::from_bytes(&bytes),
            Err(IndexError::UnsupportedVersion(3))
        ));
    }

    #[test]
    fn truncated_record() {
        let bytes = sample().to_bytes();
        assert!(matches!(
            Index::from_bytes(&bytes[..40]),
            Err(IndexError::Truncated { offset: 12, .. })
        ));
        assert!(matches!(
            Index::from_bytes(&bytes[..8]),
            Err(IndexError::Truncated { offset: 0, .. })
        ));
    }

    #[test]
    fn reserved_bits_and_file_type_are_validated() {
        let good = sample().to_bytes();

        let mut bytes = good.clone();
        bytes[36] = 1;
        assert!(matches!(Index::from_bytes(&bytes), Err(IndexError::InvalidEntry { offset: 12, .. })));

        let mut bytes = good.clone();
        bytes[38] = 0x40; // directory type bits
        assert!(matches!(Index::from_bytes(&bytes), Err(IndexError::InvalidEntry { .. })));

        let mut bytes = good;
        bytes[72] |= 0x40; // extended flag
        assert!(matches!(Index::from_bytes(&bytes), Err(IndexError::InvalidEntry { .. })));
    }

    #[test]
    fn checksum_is_verified_when_present() {
        let mut bytes = sample().to_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(matches!(Index::from_bytes(&bytes), Err(IndexError::ChecksumMismatch)));

        // A file that stops right after its records is accepted.
        let bytes = sample().to_bytes();
        let bare = &bytes[..bytes.len() - CHECKSUM_LEN];
        assert_eq!(Index::from_bytes(bare).unwrap(), sample());
    }

    #[test]
    fn extensions_before_trailer_are_skipped() {
        let bytes = sample().to_bytes();
        let mut body = bytes[..bytes.len() - CHECKSUM_LEN].to_vec();
        // A cache-tree block: path NUL, entry count SP subtree count LF.
        let payload = b"\0-1 0\n";
        body.extend_from_slice(b"TREE");
        body.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        body.extend_from_slice(payload);
        let file = [body.as_slice(), &bgit_crypto::checksum(&body)[..]].concat();
        assert_eq!(Index::from_bytes(&file).unwrap(), sample());

        let mut corrupted = file.clone();
        corrupted[body.len() - 1] ^= 0xff;
        assert!(matches!(Index::from_bytes(&corrupted), Err(IndexError::ChecksumMismatch)));
    }

    #[test]
    fn read_missing_index_is_empty_then_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::create(dir.path()).unwrap();
        assert!(Index::read(&repo).unwrap().is_empty());

        sample().write(&repo).unwrap();
        assert!(repo.path(&["index"]).is_file());
        assert_eq!(Index::read(&repo).unwrap(), sample());
    }

    #[test]
    fn add_keeps_sorted_and_replaces() {
        let mut index = Index::new();
        index.add(IndexEntry::new("b", id(1), 0)).unwrap();
        index.add(IndexEntry::new("a", id(2), 0)).unwrap();
        index.add(IndexEntry::new("a.txt", id(3), 0)).unwrap();
        index.add(IndexEntry::new("a", id(4), 0)).unwrap();

        let names: Vec<&str> = index.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "a.txt", "b"]);
        assert_eq!(index.get("a").unwrap().id, id(4));
    }

    #[test]
    fn merged_entry_clears_conflict_stages() {
        let mut index = Index::new();
        for stage in 1..=3 {
            let mut e = IndexEntry::new("f", id(stage), 0);
            e.stage = stage;
            index.add(e).unwrap();
        }
        assert_eq!(index.len(), 3);
        assert_eq!(index.conflicts(), vec!["f"]);

        index.add(IndexEntry::new("f", id(9), 0)).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.conflicts().is_empty());
    }

    #[test]
    fn add_rejects_bad_names() {
        let mut index = Index::new();
        assert!(matches!(index.add(IndexEntry::new("", id(1), 0)), Err(IndexError::InvalidPath(_))));
        assert!(matches!(index.add(IndexEntry::new("a\0b", id(1), 0)), Err(IndexError::InvalidPath(_))));
    }

    #[test]
    fn remove_drops_all_stages() {
        let mut index = sample();
        let removed = index.remove("link").unwrap();
        assert_eq!(removed.len(), 1);
        assert!(index.get("link").is_none());
        assert!(matches!(index.remove("link"), Err(IndexError::PathNotFound(_))));
    }

    #[test]
    fn write_tree_builds_nested_trees() {
        let store = InMemoryObjectStore::new();
        let readme = store.write(&Object::from(Blob::new(b"hello\n".to_vec()))).unwrap();
        let lib = store.write(&Object::from(Blob::new(b"pub fn f() {}\n".to_vec()))).unwrap();

        let mut index = Index::new();
        index.add(IndexEntry::new("README", readme, 6)).unwrap();
        index.add(IndexEntry::new("src/lib.rs", lib, 14)).unwrap();
        index.add(IndexEntry::new("src/bin/main.rs", lib, 14)).unwrap();

        let root_id = index.write_tree(&store).unwrap();
        let root = store.read(&root_id).unwrap().into_tree().unwrap();
        assert_eq!(root.len(), 2);
        let src = root.get("src").unwrap();
        assert_eq!(src.mode, "40000");

        let src_tree = store.read(&src.id).unwrap().into_tree().unwrap();
        assert!(src_tree.get("bin").unwrap().is_dir());
        assert_eq!(src_tree.get("lib.rs").unwrap().id, lib);

        // Same content built by hand hashes identically.
        let bin = Tree::new(vec![TreeEntry::new("100644", "main.rs", lib)]);
        let src_manual = Tree::new(vec![
            TreeEntry::new("100644", "lib.rs", lib),
            TreeEntry::new("40000", "bin", Object::from(bin).id()),
        ]);
        assert_eq!(Object::from(src_manual).id(), src.id);
    }

    #[test]
    fn write_tree_of_empty_index_is_empty_tree() {
        let store = InMemoryObjectStore::new();
        let id = Index::new().write_tree(&store).unwrap();
        assert_eq!(id.to_hex(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    }

    #[test]
    fn write_tree_refuses_conflicts_and_clashes() {
        let store = InMemoryObjectStore::new();

        let mut index = Index::new();
        let mut e = IndexEntry::new("f", id(1), 0);
        e.stage = 2;
        index.add(e).unwrap();
        assert!(matches!(index.write_tree(&store), Err(IndexError::UnresolvedConflict(p)) if p == "f"));

        let mut index = Index::new();
        index.add(IndexEntry::new("a", id(1), 0)).unwrap();
        index.add(IndexEntry::new("a/b", id(2), 0)).unwrap();
        assert!(matches!(index.write_tree(&store), Err(IndexError::InvalidPath(_))));
    }

    #[test]
    fn write_tree_groups_siblings_sharing_a_prefix() {
        let store = InMemoryObjectStore::new();
        let mut index = Index::new();
        for name in ["a-b/x", "a.txt", "a/b/c", "a/d", "b"] {
            index.add(IndexEntry::new(name, id(1), 0)).unwrap();
        }
        let root = store.read(&index.write_tree(&store).unwrap()).unwrap().into_tree().unwrap();
        let names: Vec<&str> = root.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a-b", "a.txt", "a", "b"]);

        let a = store.read(&root.get("a").unwrap().id).unwrap().into_tree().unwrap();
        assert!(a.get("b").unwrap().is_dir());
        assert_eq!(a.get("d").unwrap().id, id(1));
    }

    #[test]
    fn deep_paths_build_and_flatten() {
        let store = InMemoryObjectStore::new();
        let blob = store.write(&Object::from(Blob::new(b"deep\n".to_vec()))).unwrap();
        // 2048 components; the 4095-byte name also saturates the length field.
        let name = format!("{}f", "d/".repeat(2047));
        assert_eq!(name.len(), 4095);

        let mut index = Index::new();
        index.add(IndexEntry::new(name.as_str(), blob, 5)).unwrap();
        index.add(IndexEntry::new("top", blob, 5)).unwrap();
        let root = index.write_tree(&store).unwrap();

        assert_eq!(Index::from_tree(&store, &root).unwrap(), index);
        assert_eq!(Index::from_bytes(&index.to_bytes()).unwrap(), index);
    }

    #[test]
    fn from_tree_reverses_write_tree() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::create(dir.path()).unwrap();
        let store = LooseObjectStore::new(&repo);
        let blob = store.write(&Object::from(Blob::new(b"data".to_vec()))).unwrap();

        let mut index = Index::new();
        index.add(IndexEntry::new("docs/guide.md", blob, 4)).unwrap();
        let mut exe = IndexEntry::new("tools/run", blob, 4);
        exe.perms = 0o755;
        index.add(exe).unwrap();

        let root = index.write_tree(&store).unwrap();
        let rebuilt = Index::from_tree(&store, &root).unwrap();
        assert_eq!(rebuilt, index);
    }

    fn arb_entry() -> impl Strategy<Value = IndexEntry> {
        (
            "[a-z]{1,6}(/[a-z]{1,6}){0,2}",
            any::<[u8; RAW_LEN]>(),
            any::<(u32, u32, u32, u32)>(),
            0u8..=MAX_STAGE,
            any::<bool>(),
        )
            .prop_map(|(name, raw, (sec, nsec, ino, size), stage, assume_valid)| {
                let mut e = IndexEntry::new(name, ObjectId::from_raw(raw), size);
                e.mtime = (sec, nsec);
                e.ino = ino;
                e.stage = stage;
                e.assume_valid = assume_valid;
                e
            })
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(entries in proptest::collection::vec(arb_entry(), 0..16)) {
            let mut index = Index::new();
            for e in entries {
                index.add(e).unwrap();
            }
            let decoded = Index::from_bytes(&index.to_bytes()).unwrap();
            prop_assert_eq!(decoded, index);
        }
    }
}
