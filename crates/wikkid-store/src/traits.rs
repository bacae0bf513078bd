use wikkid_types::{Author, EntryKind, FileId, ObjectId, RevisionId, WikiPath};

use crate::error::StoreResult;
use crate::object::{Revision, StoredObject};
use crate::text;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written; the same data always produces the
///   same ID.
/// - Concurrent reads are always safe.
/// - The store never interprets object contents.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists, this is a no-op (idempotent).
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;
}

/// Operations available while holding a shared (read) scope.
///
/// Every answer reflects the last committed state of the working tree.
pub trait TreeRead {
    /// Resolve a path to its stable identity.
    fn path_to_id(&self, path: &WikiPath) -> Option<FileId>;

    /// Reverse lookup of [`TreeRead::path_to_id`].
    fn id_to_path(&self, id: &FileId) -> Option<WikiPath>;

    /// Classify an identity. Unknown ids are [`EntryKind::Absent`].
    fn kind(&self, id: &FileId) -> EntryKind;

    /// Full content of a file.
    ///
    /// Fails with `UnknownFile` for unknown ids and `NotAFile` for
    /// directories.
    fn read_content(&self, id: &FileId) -> StoreResult<Vec<u8>>;

    /// Revision that last added or modified this entry.
    fn last_changed(&self, id: &FileId) -> StoreResult<Option<RevisionId>>;

    /// Names and kinds of the direct children of a directory, sorted by name.
    fn children(&self, dir: &WikiPath) -> StoreResult<Vec<(String, EntryKind)>>;

    /// The newest revision, or `None` before the first commit.
    fn head(&self) -> Option<RevisionId>;

    /// Load a revision by id.
    fn revision(&self, id: &RevisionId) -> StoreResult<Option<Revision>>;

    /// Whether the file's content passes the text check.
    fn is_text(&self, id: &FileId) -> StoreResult<bool> {
        Ok(text::is_text(&self.read_content(id)?))
    }

    /// Walk history from the head, newest first, at most `limit` revisions.
    fn revisions(&self, limit: usize) -> StoreResult<Vec<Revision>> {
        let mut out = Vec::new();
        let mut next = self.head();
        while let Some(id) = next {
            if out.len() >= limit {
                break;
            }
            match self.revision(&id)? {
                Some(rev) => {
                    next = rev.parent;
                    out.push(rev);
                }
                None => break,
            }
        }
        Ok(out)
    }
}

/// Operations available while holding the exclusive (write) scope.
///
/// Mutations are staged inside the scope and only become visible when
/// [`TreeWrite::commit`] succeeds. Dropping the scope without committing
/// discards them, so a failed operation leaves the tree unchanged.
/// Reads through a write scope see the staged state.
pub trait TreeWrite: TreeRead {
    /// Create `dir` and every missing ancestor as directories.
    ///
    /// Fails with `NotADirectory` if a file occupies any prefix.
    fn create_prefix(&mut self, dir: &WikiPath) -> StoreResult<()>;

    /// Write the full content of a file, creating or replacing it.
    fn put_bytes(&mut self, path: &WikiPath, bytes: &[u8]) -> StoreResult<()>;

    /// Start versioning a written path and any unversioned parents.
    ///
    /// Returns the identity of `path`; already-versioned paths keep theirs.
    fn add_path(&mut self, path: &WikiPath) -> StoreResult<FileId>;

    /// Record every staged change as one new revision.
    fn commit(&mut self, message: &str, author: &Author) -> StoreResult<RevisionId>;
}

/// A version-controlled working tree with shared/exclusive scoped locking.
///
/// Scopes are RAII guards: the lock is released when the scope is dropped,
/// on every exit path. Readers share; a writer excludes everyone. Acquisition
/// blocks without timeout.
pub trait WorkingTree: Send + Sync {
    type ReadScope<'a>: TreeRead
    where
        Self: 'a;
    type WriteScope<'a>: TreeWrite
    where
        Self: 'a;

    fn lock_read(&self) -> StoreResult<Self::ReadScope<'_>>;

    fn lock_write(&self) -> StoreResult<Self::WriteScope<'_>>;
}
