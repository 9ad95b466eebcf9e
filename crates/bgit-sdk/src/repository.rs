use std::collections::HashSet;
use std::path::Path;

use bgit_index::Index;
use bgit_refs::{find_object, FileRefStore, Head, RefStore, RefValue};
use bgit_repo::Repository;
use bgit_store::tree::normalize_mode;
use bgit_store::{
    write_object, Commit, EntryMode, LooseObjectStore, Object, ObjectKind, ObjectStore, StoreError,
};
use bgit_types::ObjectId;
use tracing::{debug, info};

use crate::error::SdkResult;
use crate::listing::{LogEntry, TreeListing};

/// High-level bgit repository API.
///
/// Bundles a [`Repository`] with the loose object store and the file ref
/// store rooted in it. Cloning is cheap enough for per-thread handles.
#[derive(Clone, Debug)]
pub struct Bgit {
    repo: Repository,
    objects: LooseObjectStore,
    refs: FileRefStore,
}

impl Bgit {
    /// Create a new repository at `path`.
    pub fn init(path: impl AsRef<Path>) -> SdkResult<Self> {
        let repo = Repository::create(path)?;
        info!(worktree = %repo.worktree().display(), "created repository");
        Ok(Self::from_repository(repo))
    }

    /// Open the repository whose worktree root is `path`.
    pub fn open(path: impl AsRef<Path>) -> SdkResult<Self> {
        Ok(Self::from_repository(Repository::open(path)?))
    }

    /// Open the repository containing `path`, searching parent directories.
    pub fn discover(path: impl AsRef<Path>) -> SdkResult<Self> {
        Ok(Self::from_repository(Repository::discover(path)?))
    }

    pub fn from_repository(repo: Repository) -> Self {
        let objects = LooseObjectStore::new(&repo);
        let refs = FileRefStore::new(&repo);
        Self { repo, objects, refs }
    }

    // -----------------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------------

    /// Digest of `data` as an object of `kind`, storing it when `write` is set.
    ///
    /// The payload is parsed first, so a malformed tree, commit or tag is
    /// rejected instead of being hashed.
    pub fn hash_object(&self, kind: ObjectKind, data: &[u8], write: bool) -> SdkResult<ObjectId> {
        let object = Object::deserialize(kind, data)?;
        let id = write_object(&object, write.then_some(&self.repo))?;
        debug!(%id, %kind, write, "hashed object");
        Ok(id)
    }

    /// Resolve `name` and return the object it denotes.
    ///
    /// With `kind` set, tags and commits are peeled until an object of that
    /// kind is reached.
    pub fn read(&self, name: &str, kind: Option<ObjectKind>) -> SdkResult<(ObjectId, Object)> {
        let id = find_object(&self.refs, &self.objects, name, kind, true)?;
        Ok((id, self.objects.read(&id)?))
    }

    /// Serialized payload of the object `name` resolves to.
    pub fn cat_file(&self, name: &str, kind: Option<ObjectKind>) -> SdkResult<Vec<u8>> {
        let (_, object) = self.read(name, kind)?;
        Ok(object.serialize())
    }

    /// The object ID `name` denotes, without peeling.
    pub fn rev_parse(&self, name: &str) -> SdkResult<ObjectId> {
        Ok(find_object(&self.refs, &self.objects, name, None, false)?)
    }

    /// List the tree `name` resolves to.
    ///
    /// Without `recursive` every entry is listed once. With it, subtrees are
    /// expanded in place and only their contents appear.
    pub fn ls_tree(&self, name: &str, recursive: bool) -> SdkResult<Vec<TreeListing>> {
        let (id, _) = self.read(name, Some(ObjectKind::Tree))?;
        let root = self.objects.read(&id)?.into_tree()?;

        // One frame per tree being walked; the innermost is last.
        let mut frames = vec![(String::new(), root.entries.into_iter())];
        let mut out = Vec::new();
        while let Some((prefix, entries)) = frames.last_mut() {
            let Some(entry) = entries.next() else {
                frames.pop();
                continue;
            };
            let path = if prefix.is_empty() {
                entry.name.clone()
            } else {
                format!("{prefix}/{}", entry.name)
            };
            let mode = entry.entry_mode().ok_or_else(|| {
                StoreError::Malformed(format!("unknown mode {:?} for {path}", entry.mode))
            })?;

            if recursive && mode == EntryMode::Directory {
                let subtree = self.objects.read(&entry.id)?.into_tree()?;
                frames.push((path, subtree.entries.into_iter()));
            } else {
                out.push(TreeListing {
                    mode: normalize_mode(&entry.mode),
                    kind: mode.object_kind(),
                    id: entry.id,
                    path,
                });
            }
        }
        Ok(out)
    }

    /// Commit history reachable from `name`.
    ///
    /// Depth-first in parent order: a commit is followed by its first
    /// parent's history before its second parent's. Each commit appears once.
    pub fn log(&self, name: &str) -> SdkResult<Vec<LogEntry>> {
        let (start, _) = self.read(name, Some(ObjectKind::Commit))?;

        let mut seen = HashSet::new();
        let mut stack = vec![start];
        let mut entries = Vec::new();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let commit: Commit = self.objects.read(&id)?.into_commit()?;
            stack.extend(commit.parents()?.into_iter().rev());
            entries.push(LogEntry { id, commit });
        }
        Ok(entries)
    }

    // -----------------------------------------------------------------------
    // Index
    // -----------------------------------------------------------------------

    /// The staging index, empty if none has been written.
    pub fn read_index(&self) -> SdkResult<Index> {
        Ok(Index::read(&self.repo)?)
    }

    pub fn write_index(&self, index: &Index) -> SdkResult<()> {
        Ok(index.write(&self.repo)?)
    }

    /// Store the trees described by the current index and return the root.
    pub fn write_tree(&self) -> SdkResult<ObjectId> {
        let id = self.read_index()?.write_tree(&self.objects)?;
        info!(%id, "wrote tree from index");
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Refs
    // -----------------------------------------------------------------------

    pub fn head(&self) -> SdkResult<Option<Head>> {
        Ok(self.refs.head()?)
    }

    /// Point `name` (a full ref name) at `id`.
    pub fn update_ref(&self, name: &str, id: ObjectId) -> SdkResult<()> {
        Ok(self.refs.write_ref(name, &RefValue::Direct(id))?)
    }

    /// Branch names with the commits they point at. Dangling branches are
    /// skipped.
    pub fn branches(&self) -> SdkResult<Vec<(String, ObjectId)>> {
        let mut out = Vec::new();
        for (name, value) in self.refs.branches()? {
            let short = name.trim_start_matches("refs/heads/").to_string();
            if let Some(id) = self.refs.resolve_value(&value)? {
                out.push((short, id));
            }
        }
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn objects(&self) -> &LooseObjectStore {
        &self.objects
    }

    pub fn refs(&self) -> &FileRefStore {
        &self.refs
    }
}
