//! Shared and exclusive scopes over an inventory guarded by a `RwLock`.
//!
//! Both working tree implementations hand out these scopes. A write scope
//! stages every mutation in a [`Staged`] change set; `commit` builds the next
//! inventory as a copy, writes its objects, persists it, and only then swaps
//! it in. Any failure before the swap leaves the committed inventory intact.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::debug;
use wikkid_types::{Author, EntryKind, FileId, RevisionId, WikiPath};

use crate::error::{StoreError, StoreResult};
use crate::inventory::{Inventory, InventoryEntry};
use crate::object::{Change, ChangeAction, Record, Revision, RevisionObject, StoredObject};
use crate::traits::{ObjectStore, TreeRead, TreeWrite};

/// Durable sink for a committed inventory.
///
/// Called once per commit with the next inventory and the paths the revision
/// touched. An error aborts the commit before the in-memory swap.
pub(crate) trait InventorySink: Send + Sync {
    fn persist(
        &self,
        objects: &dyn ObjectStore,
        inventory: &Inventory,
        changes: &[Change],
    ) -> StoreResult<()>;
}

/// Sink for trees that live only in memory.
pub(crate) struct NoPersist;

impl InventorySink for NoPersist {
    fn persist(&self, _: &dyn ObjectStore, _: &Inventory, _: &[Change]) -> StoreResult<()> {
        Ok(())
    }
}

fn load_content(
    objects: &dyn ObjectStore,
    inventory: &Inventory,
    id: &FileId,
) -> StoreResult<Vec<u8>> {
    let path = inventory.path_of(id).ok_or(StoreError::UnknownFile(*id))?;
    let entry = inventory.get(path).ok_or(StoreError::UnknownFile(*id))?;
    let blob_id = match (entry.kind, entry.blob) {
        (EntryKind::File, Some(blob)) => blob,
        _ => return Err(StoreError::NotAFile(path.clone())),
    };
    let obj = objects.read(&blob_id)?.ok_or(StoreError::NotFound(blob_id))?;
    obj.into_blob()
}

fn load_revision(objects: &dyn ObjectStore, id: &RevisionId) -> StoreResult<Option<Revision>> {
    match objects.read(id.object_id())? {
        Some(obj) => Ok(Some(RevisionObject::decode(&obj)?.into_revision(*id))),
        None => Ok(None),
    }
}

fn last_changed_of(inventory: &Inventory, id: &FileId) -> StoreResult<Option<RevisionId>> {
    let path = inventory.path_of(id).ok_or(StoreError::UnknownFile(*id))?;
    Ok(inventory.get(path).and_then(|e| e.last_changed))
}

fn kind_of(inventory: &Inventory, id: &FileId) -> EntryKind {
    inventory
        .path_of(id)
        .and_then(|p| inventory.get(p))
        .map(|e| e.kind)
        .unwrap_or(EntryKind::Absent)
}

fn children_of(inventory: &Inventory, dir: &WikiPath) -> StoreResult<Vec<(String, EntryKind)>> {
    match inventory.get(dir).map(|e| e.kind) {
        Some(EntryKind::Directory) => Ok(inventory.children(dir)),
        Some(_) => Err(StoreError::NotADirectory(dir.clone())),
        None => Ok(Vec::new()),
    }
}

// ---------------------------------------------------------------------------
// ReadScope
// ---------------------------------------------------------------------------

/// Shared scope: a read lock on the committed inventory.
pub struct ReadScope<'a> {
    objects: &'a dyn ObjectStore,
    inventory: RwLockReadGuard<'a, Inventory>,
}

impl<'a> ReadScope<'a> {
    pub(crate) fn new(objects: &'a dyn ObjectStore, inventory: RwLockReadGuard<'a, Inventory>) -> Self {
        Self { objects, inventory }
    }
}

impl TreeRead for ReadScope<'_> {
    fn path_to_id(&self, path: &WikiPath) -> Option<FileId> {
        self.inventory.get(path).map(|e| e.file_id)
    }

    fn id_to_path(&self, id: &FileId) -> Option<WikiPath> {
        self.inventory.path_of(id).cloned()
    }

    fn kind(&self, id: &FileId) -> EntryKind {
        kind_of(&self.inventory, id)
    }

    fn read_content(&self, id: &FileId) -> StoreResult<Vec<u8>> {
        load_content(self.objects, &self.inventory, id)
    }

    fn last_changed(&self, id: &FileId) -> StoreResult<Option<RevisionId>> {
        last_changed_of(&self.inventory, id)
    }

    fn children(&self, dir: &WikiPath) -> StoreResult<Vec<(String, EntryKind)>> {
        children_of(&self.inventory, dir)
    }

    fn head(&self) -> Option<RevisionId> {
        self.inventory.head()
    }

    fn revision(&self, id: &RevisionId) -> StoreResult<Option<Revision>> {
        load_revision(self.objects, id)
    }
}

// ---------------------------------------------------------------------------
// WriteScope
// ---------------------------------------------------------------------------

/// Uncommitted changes held by a write scope.
#[derive(Debug, Default)]
struct Staged {
    /// Directories created in the working tree, versioned or not.
    dirs: BTreeSet<WikiPath>,
    /// Full content written to files in the working tree.
    files: BTreeMap<WikiPath, Vec<u8>>,
    /// Paths newly versioned in this scope.
    added: BTreeMap<WikiPath, FileId>,
    added_ids: HashMap<FileId, WikiPath>,
}

impl Staged {
    fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty() && self.added.is_empty()
    }
}

/// Exclusive scope: a write lock on the inventory plus staged changes.
pub struct WriteScope<'a> {
    objects: &'a dyn ObjectStore,
    sink: &'a dyn InventorySink,
    inventory: RwLockWriteGuard<'a, Inventory>,
    staged: Staged,
}

impl<'a> WriteScope<'a> {
    pub(crate) fn new(
        objects: &'a dyn ObjectStore,
        sink: &'a dyn InventorySink,
        inventory: RwLockWriteGuard<'a, Inventory>,
    ) -> Self {
        Self {
            objects,
            sink,
            inventory,
            staged: Staged::default(),
        }
    }

    /// Kind of a path in the working tree, including unversioned changes.
    fn working_kind(&self, path: &WikiPath) -> EntryKind {
        if let Some(entry) = self.inventory.get(path) {
            return entry.kind;
        }
        if self.staged.files.contains_key(path) {
            EntryKind::File
        } else if self.staged.dirs.contains(path) {
            EntryKind::Directory
        } else {
            EntryKind::Absent
        }
    }

    fn is_versioned(&self, path: &WikiPath) -> bool {
        self.inventory.get(path).is_some() || self.staged.added.contains_key(path)
    }

    /// Returns `true` if nothing has been staged in this scope.
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
    }
}

impl TreeRead for WriteScope<'_> {
    fn path_to_id(&self, path: &WikiPath) -> Option<FileId> {
        self.inventory
            .get(path)
            .map(|e| e.file_id)
            .or_else(|| self.staged.added.get(path).copied())
    }

    fn id_to_path(&self, id: &FileId) -> Option<WikiPath> {
        self.inventory
            .path_of(id)
            .or_else(|| self.staged.added_ids.get(id))
            .cloned()
    }

    fn kind(&self, id: &FileId) -> EntryKind {
        match self.staged.added_ids.get(id) {
            Some(path) => self.working_kind(path),
            None => kind_of(&self.inventory, id),
        }
    }

    fn read_content(&self, id: &FileId) -> StoreResult<Vec<u8>> {
        let path = self.id_to_path(id).ok_or(StoreError::UnknownFile(*id))?;
        if let Some(bytes) = self.staged.files.get(&path) {
            return Ok(bytes.clone());
        }
        load_content(self.objects, &self.inventory, id)
    }

    fn last_changed(&self, id: &FileId) -> StoreResult<Option<RevisionId>> {
        if self.staged.added_ids.contains_key(id) {
            return Ok(None);
        }
        last_changed_of(&self.inventory, id)
    }

    fn children(&self, dir: &WikiPath) -> StoreResult<Vec<(String, EntryKind)>> {
        children_of(&self.inventory, dir)
    }

    fn head(&self) -> Option<RevisionId> {
        self.inventory.head()
    }

    fn revision(&self, id: &RevisionId) -> StoreResult<Option<Revision>> {
        load_revision(self.objects, id)
    }
}

impl TreeWrite for WriteScope<'_> {
    fn create_prefix(&mut self, dir: &WikiPath) -> StoreResult<()> {
        for prefix in dir.prefixes() {
            match self.working_kind(&prefix) {
                EntryKind::Directory => {}
                EntryKind::File => return Err(StoreError::NotADirectory(prefix)),
                EntryKind::Absent => {
                    self.staged.dirs.insert(prefix);
                }
            }
        }
        Ok(())
    }

    fn put_bytes(&mut self, path: &WikiPath, bytes: &[u8]) -> StoreResult<()> {
        let parent = path.parent().ok_or_else(|| StoreError::NotAFile(path.clone()))?;
        match self.working_kind(&parent) {
            EntryKind::Directory => {}
            EntryKind::File => return Err(StoreError::NotADirectory(parent)),
            EntryKind::Absent => return Err(StoreError::MissingParent(path.clone())),
        }
        if self.working_kind(path) == EntryKind::Directory {
            return Err(StoreError::NotAFile(path.clone()));
        }
        self.staged.files.insert(path.clone(), bytes.to_vec());
        Ok(())
    }

    fn add_path(&mut self, path: &WikiPath) -> StoreResult<FileId> {
        if self.working_kind(path) == EntryKind::Absent {
            return Err(StoreError::NothingToAdd(path.clone()));
        }
        for prefix in path.prefixes() {
            if !self.is_versioned(&prefix) {
                let id = FileId::new();
                self.staged.added.insert(prefix.clone(), id);
                self.staged.added_ids.insert(id, prefix);
            }
        }
        self.path_to_id(path)
            .ok_or_else(|| StoreError::NothingToAdd(path.clone()))
    }

    fn commit(&mut self, message: &str, author: &Author) -> StoreResult<RevisionId> {
        let mut next = self.inventory.clone();
        let mut changes = Vec::new();

        for (path, file_id) in &self.staged.added {
            let kind = self.working_kind(path);
            let blob = match self.staged.files.get(path) {
                Some(bytes) if kind == EntryKind::File => {
                    Some(self.objects.write(&StoredObject::blob(bytes.clone()))?)
                }
                _ => None,
            };
            next.insert(
                path.clone(),
                InventoryEntry {
                    file_id: *file_id,
                    kind,
                    blob,
                    last_changed: None,
                },
            );
            changes.push(Change {
                path: path.clone(),
                file_id: *file_id,
                action: ChangeAction::Added,
            });
        }

        for (path, bytes) in &self.staged.files {
            if self.staged.added.contains_key(path) {
                continue;
            }
            let Some(entry) = next.get_mut(path) else {
                debug!(path = %path, "dropping unversioned file at commit");
                continue;
            };
            let blob = self.objects.write(&StoredObject::blob(bytes.clone()))?;
            if entry.blob != Some(blob) {
                entry.blob = Some(blob);
                changes.push(Change {
                    path: path.clone(),
                    file_id: entry.file_id,
                    action: ChangeAction::Modified,
                });
            }
        }

        let manifest = self.objects.write(&next.to_manifest().encode()?)?;
        let record = RevisionObject {
            parent: next.head(),
            author: author.clone(),
            message: message.to_string(),
            timestamp: Utc::now(),
            changes,
            manifest,
        };
        let revision = RevisionId::new(self.objects.write(&record.encode()?)?);

        for change in &record.changes {
            if let Some(entry) = next.get_mut(&change.path) {
                entry.last_changed = Some(revision);
            }
        }
        next.set_head(revision);

        self.sink.persist(self.objects, &next, &record.changes)?;
        *self.inventory = next;
        self.staged = Staged::default();

        debug!(
            revision = %revision.short_id(),
            changes = record.changes.len(),
            author = %author,
            "committed revision"
        );
        Ok(revision)
    }
}
