use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use bgit_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{Object, ObjectKind};
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Objects are held as serialized payloads
/// behind a `RwLock`, so every read decodes afresh just like the loose store.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, (ObjectKind, Vec<u8>)>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return a sorted list of all object IDs in the store.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<ObjectId> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Object> {
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let (kind, payload) = map.get(id).ok_or(StoreError::NotFound(*id))?;
        Object::deserialize(*kind, payload)
    }

    fn write(&self, object: &Object) -> StoreResult<ObjectId> {
        let id = object.id();
        let mut map = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        map.entry(id)
            .or_insert_with(|| (object.kind(), object.serialize()));
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map.contains_key(id))
    }

    fn find_by_prefix(&self, prefix: &str) -> StoreResult<Vec<ObjectId>> {
        if prefix.len() < 2 {
            return Ok(Vec::new());
        }
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<ObjectId> = map
            .keys()
            .filter(|id| id.starts_with_hex(prefix))
            .copied()
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kvlm::Kvlm;
    use crate::object::{Blob, Commit};
    use crate::tree::{Tree, TreeEntry};

    fn blob(content: &[u8]) -> Object {
        Object::from(Blob::new(content))
    }

    #[test]
    fn write_and_read_blob() {
        let store = InMemoryObjectStore::new();
        let obj = blob(b"hello\n");
        let id = store.write(&obj).unwrap();
        assert_eq!(id.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert_eq!(store.read(&id).unwrap(), obj);
    }

    #[test]
    fn write_and_read_tree() {
        let store = InMemoryObjectStore::new();
        let blob_id = store.write(&blob(b"x")).unwrap();
        let tree = Object::from(Tree::new(vec![
            TreeEntry::new("100644", "hello.txt", blob_id),
            TreeEntry::new("40000", "subdir", Object::from(Tree::default()).id()),
        ]));
        let id = store.write(&tree).unwrap();

        let read_back = store.read(&id).unwrap().into_tree().unwrap();
        assert_eq!(read_back.len(), 2);
        assert!(read_back.get("hello.txt").is_some());
    }

    #[test]
    fn write_and_read_commit() {
        let store = InMemoryObjectStore::new();
        let mut kvlm = Kvlm::new();
        kvlm.push("tree", "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
        kvlm.push("author", "A <a@b> 0 +0000");
        kvlm.set_message("first\n");
        let id = store.write(&Object::from(Commit::new(kvlm))).unwrap();

        let commit = store.read(&id).unwrap().into_commit().unwrap();
        assert_eq!(commit.message(), b"first\n");
        assert!(commit.parents().unwrap().is_empty());
    }

    #[test]
    fn same_content_is_stored_once() {
        let store = InMemoryObjectStore::new();
        let id1 = store.write(&blob(b"identical")).unwrap();
        let id2 = store.write(&blob(b"identical")).unwrap();
        assert_eq!(id1, id2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn read_missing_object_is_not_found() {
        let store = InMemoryObjectStore::new();
        let id = ObjectId::from_raw([7; 20]);
        assert!(matches!(store.read(&id), Err(StoreError::NotFound(x)) if x == id));
        assert!(!store.exists(&id).unwrap());
    }

    #[test]
    fn prefix_lookup() {
        let store = InMemoryObjectStore::new();
        let id = store.write(&blob(b"hello\n")).unwrap();
        store.write(&blob(b"other")).unwrap();

        assert_eq!(store.find_by_prefix("ce0136").unwrap(), vec![id]);
        assert_eq!(store.find_by_prefix("CE0136").unwrap(), vec![id]);
        assert!(store.find_by_prefix("c").unwrap().is_empty());
        assert_eq!(store.all_ids().len(), 2);
    }

    #[test]
    fn write_batch_returns_ids_in_order() {
        let store = InMemoryObjectStore::new();
        let objects = vec![blob(b"1"), blob(b"2"), blob(b"3")];
        let ids = store.write_batch(&objects).unwrap();
        assert_eq!(ids.len(), 3);
        for (obj, id) in objects.iter().zip(&ids) {
            assert_eq!(obj.id(), *id);
        }
    }

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryObjectStore::new());
        let id = store.write(&blob(b"shared data")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    assert_eq!(store.read(&id).unwrap().id(), id);
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
    }

    #[test]
    fn debug_format() {
        let store = InMemoryObjectStore::default();
        store.write(&blob(b"x")).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("object_count"));
    }
}
