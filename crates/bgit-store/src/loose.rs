use std::fs;
use std::path::PathBuf;

use bgit_repo::{write_new_atomic, Repository};
use bgit_types::ObjectId;
use tracing::{debug, trace};

use crate::error::{StoreError, StoreResult};
use crate::frame::{decode_frame, encode_frame};
use crate::object::{Object, ObjectKind};
use crate::traits::ObjectStore;

/// One-file-per-object store under `<git_dir>/objects/`.
///
/// An object with hex ID `ab12...` lives at `objects/ab/12...`, holding the
/// zlib-compressed frame. Files are created once and never rewritten.
#[derive(Clone, Debug)]
pub struct LooseObjectStore {
    repo: Repository,
}

impl LooseObjectStore {
    /// Store backed by the repository's `objects/` directory.
    pub fn new(repo: &Repository) -> Self {
        Self { repo: repo.clone() }
    }

    /// The repository this store writes into.
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Path of the loose file for `id`, whether or not it exists.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (dir, file) = id.loose_parts();
        self.repo.path(&["objects", &dir, &file])
    }

    fn read_raw(&self, id: &ObjectId) -> StoreResult<(ObjectKind, Vec<u8>)> {
        let (dir, file) = id.loose_parts();
        let path = self
            .repo
            .file(&["objects", &dir, &file], false)?
            .filter(|p| p.is_file())
            .ok_or(StoreError::NotFound(*id))?;

        let (type_name, payload) = decode_frame(&fs::read(&path)?)?;
        let kind = type_name.parse()?;
        trace!(id = %id.short_hex(), kind = %kind, len = payload.len(), "read object");
        Ok((kind, payload))
    }
}

impl ObjectStore for LooseObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Object> {
        let (kind, payload) = self.read_raw(id)?;
        Object::deserialize(kind, &payload)
    }

    fn write(&self, object: &Object) -> StoreResult<ObjectId> {
        let payload = object.serialize();
        let kind = object.kind();
        let id = bgit_crypto::digest_of(kind.as_str(), &payload);
        let (dir, _) = id.loose_parts();

        // Raises DirectoryConflict when a plain file is in the way.
        self.repo.dir(&["objects", &dir], true)?;
        let path = self.object_path(&id);
        if path.exists() {
            debug!(id = %id.short_hex(), "object already present");
            return Ok(id);
        }

        let frame = encode_frame(kind.as_str(), &payload)?;
        if write_new_atomic(&path, &frame)? {
            debug!(id = %id.short_hex(), kind = %kind, len = payload.len(), "wrote object");
        }
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }

    fn find_by_prefix(&self, prefix: &str) -> StoreResult<Vec<ObjectId>> {
        let Some(dir) = prefix.get(..2) else {
            return Ok(Vec::new());
        };
        let dir = dir.to_ascii_lowercase();
        let Some(path) = self.repo.dir(&["objects", &dir], false)? else {
            return Ok(Vec::new());
        };

        let mut ids = Vec::new();
        for entry in fs::read_dir(&path)? {
            let entry = entry?;
            let Some(rest) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            // Leftover temp files and other debris are not objects.
            let Ok(id) = ObjectId::from_hex(&format!("{dir}{rest}")) else {
                continue;
            };
            if id.starts_with_hex(prefix) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Read the object `id` from the repository.
pub fn read_object(repo: &Repository, id: &ObjectId) -> StoreResult<Object> {
    LooseObjectStore::new(repo).read(id)
}

/// Compute the ID of `object`, storing it when a repository is given.
pub fn write_object(object: &Object, repo: Option<&Repository>) -> StoreResult<ObjectId> {
    match repo {
        Some(repo) => LooseObjectStore::new(repo).write(object),
        None => Ok(object.id()),
    }
}
