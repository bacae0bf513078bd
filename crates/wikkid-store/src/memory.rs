use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use wikkid_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

type ObjectMap = HashMap<ObjectId, StoredObject>;

/// Object store for [`crate::VolatileTree`]: a `HashMap` behind a `RwLock`.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<ObjectMap>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn shared(&self) -> StoreResult<RwLockReadGuard<'_, ObjectMap>> {
        self.objects
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn exclusive(&self) -> StoreResult<RwLockWriteGuard<'_, ObjectMap>> {
        self.objects
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    // The statistics below only count, so they read through a poisoned lock.
    fn snapshot(&self) -> RwLockReadGuard<'_, ObjectMap> {
        self.objects.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of distinct objects held.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Payload bytes across all objects.
    pub fn total_bytes(&self) -> u64 {
        self.snapshot().values().map(|obj| obj.size).sum()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        Ok(self.shared()?.get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        self.exclusive()?
            .entry(id)
            .or_insert_with(|| object.clone());
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.shared()?.contains_key(id))
    }
}

impl fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("objects", &self.len())
            .field("bytes", &self.total_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Manifest, ObjectKind, Record, RevisionObject};
    use chrono::Utc;
    use wikkid_types::Author;

    fn page(content: &str) -> StoredObject {
        StoredObject::blob(content)
    }

    #[test]
    fn page_content_roundtrips() {
        let store = InMemoryObjectStore::new();
        let obj = page("Welcome to the wiki.");
        let id = store.write(&obj).unwrap();
        let back = store.read(&id).unwrap().unwrap();
        assert_eq!(back, obj);
        assert_eq!(back.kind, ObjectKind::Blob);
    }

    #[test]
    fn identical_pages_share_one_object() {
        let store = InMemoryObjectStore::new();
        let a = store.write(&page("same text")).unwrap();
        let b = store.write(&page("same text")).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_bytes(), 9);
    }

    #[test]
    fn empty_page_is_storable() {
        let store = InMemoryObjectStore::new();
        let id = store.write(&page("")).unwrap();
        assert_eq!(store.read(&id).unwrap().unwrap().size, 0);
    }

    #[test]
    fn unknown_ids() {
        let store = InMemoryObjectStore::new();
        assert!(store.is_empty());
        let missing = ObjectId::from_bytes(b"never written");
        assert!(!store.exists(&missing).unwrap());
        assert!(store.read(&missing).unwrap().is_none());
    }

    #[test]
    fn revision_objects_roundtrip() {
        let store = InMemoryObjectStore::new();
        let manifest = store
            .write(&Manifest::new(Vec::new()).encode().unwrap())
            .unwrap();
        let record = RevisionObject {
            parent: None,
            author: Author::new("Ada", "ada@example.com"),
            message: "Hello world.".into(),
            timestamp: Utc::now(),
            changes: Vec::new(),
            manifest,
        };
        let id = store.write(&record.encode().unwrap()).unwrap();
        let back = RevisionObject::decode(&store.read(&id).unwrap().unwrap()).unwrap();
        assert_eq!(back.message, "Hello world.");
        assert_eq!(back.manifest, manifest);
        assert!(store.exists(&manifest).unwrap());
    }

    #[test]
    fn readers_run_in_parallel() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryObjectStore::new());
        let id = store.write(&page("shared")).unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.read(&id).unwrap().unwrap().compute_id())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), id);
        }
    }

    #[test]
    fn debug_shows_counts() {
        let store = InMemoryObjectStore::new();
        store.write(&page("x")).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("objects: 1"));
        assert!(debug.contains("bytes: 1"));
    }
}
