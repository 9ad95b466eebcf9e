use bgit_types::ObjectId;

use crate::error::StoreResult;
use crate::object::Object;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same object always produces
///   the same ID, so a write of an existing ID is a no-op.
/// - Concurrent reads are always safe.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read and decode an object by ID.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if the
    /// object is absent.
    fn read(&self, id: &ObjectId) -> StoreResult<Object>;

    /// Write an object and return its ID.
    fn write(&self, object: &Object) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// All stored IDs whose hex form starts with `prefix`, sorted.
    ///
    /// The prefix must be at least two hex characters; shorter prefixes
    /// match nothing.
    fn find_by_prefix(&self, prefix: &str) -> StoreResult<Vec<ObjectId>>;

    /// Write multiple objects and return their IDs.
    fn write_batch(&self, objects: &[Object]) -> StoreResult<Vec<ObjectId>> {
        objects.iter().map(|obj| self.write(obj)).collect()
    }
}
