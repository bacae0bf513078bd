//! A working tree persisted under a directory.
//!
//! On-disk layout:
//! ```text
//! <root>/<path>                    checked-out working files and directories
//! <root>/.wikkid/inventory.json    committed inventory (JSON)
//! <root>/.wikkid/objects/<hex>     one file per object: "<kind>\n" + data
//! ```
//!
//! Every file is written to a temporary sibling and renamed into place, so a
//! crash never leaves a half-written object, working file or inventory. A
//! commit checks out the paths it touched, then renames the inventory into
//! place. That rename is the commit point: objects written before a failed
//! commit are unreferenced and invisible.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tempfile::NamedTempFile;
use tracing::{debug, info};
use wikkid_types::{EntryKind, ObjectId, WikiPath};

use crate::error::{StoreError, StoreResult};
use crate::inventory::Inventory;
use crate::object::{Change, ObjectKind, StoredObject};
use crate::scope::{InventorySink, ReadScope, WriteScope};
use crate::traits::{ObjectStore, WorkingTree};

/// Name of the metadata directory inside a working tree root.
pub const META_DIR: &str = ".wikkid";

const INVENTORY_FILE: &str = "inventory.json";
const OBJECTS_DIR: &str = "objects";

fn write_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> StoreResult<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// DiskObjectStore
// ---------------------------------------------------------------------------

/// Object store keeping one file per object.
#[derive(Debug)]
pub struct DiskObjectStore {
    dir: PathBuf,
}

impl DiskObjectStore {
    /// Open (or create) an object directory.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn object_path(&self, id: &ObjectId) -> PathBuf {
        self.dir.join(id.to_hex())
    }
}

impl ObjectStore for DiskObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let raw = match fs::read(self.object_path(id)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let split = raw
            .iter()
            .position(|b| *b == b'\n')
            .ok_or_else(|| StoreError::CorruptObject {
                id: *id,
                reason: "missing kind header".into(),
            })?;
        let kind = std::str::from_utf8(&raw[..split])
            .ok()
            .and_then(ObjectKind::parse)
            .ok_or_else(|| StoreError::CorruptObject {
                id: *id,
                reason: "unknown kind header".into(),
            })?;
        let obj = StoredObject::new(kind, raw[split + 1..].to_vec());
        let computed = obj.compute_id();
        if computed != *id {
            return Err(StoreError::HashMismatch { id: *id, computed });
        }
        Ok(Some(obj))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        let target = self.object_path(&id);
        if target.exists() {
            return Ok(id);
        }
        let mut raw = Vec::with_capacity(object.data.len() + 16);
        raw.extend_from_slice(object.kind.as_str().as_bytes());
        raw.push(b'\n');
        raw.extend_from_slice(&object.data);
        write_atomically(&self.dir, &target, &raw)?;
        debug!(id = %id.short_hex(), kind = %object.kind, size = object.size, "wrote object");
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).exists())
    }
}

// ---------------------------------------------------------------------------
// DiskTree
// ---------------------------------------------------------------------------

/// Persists commits: working files under `root`, the inventory under `dir`.
struct InventoryFile {
    root: PathBuf,
    dir: PathBuf,
    path: PathBuf,
}

impl InventoryFile {
    fn load(&self) -> StoreResult<Inventory> {
        let raw = fs::read(&self.path)?;
        serde_json::from_slice(&raw).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn save(&self, inventory: &Inventory) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(inventory)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        write_atomically(&self.dir, &self.path, &json)
    }

    /// Write the committed state of `path` into the working directory.
    fn check_out(
        &self,
        objects: &dyn ObjectStore,
        inventory: &Inventory,
        path: &WikiPath,
    ) -> StoreResult<()> {
        let Some(entry) = inventory.get(path) else {
            return Ok(());
        };
        let target = self.root.join(path.as_str());
        match (entry.kind, entry.blob) {
            (EntryKind::Directory, _) => fs::create_dir_all(&target)?,
            (EntryKind::File, Some(blob)) => {
                let bytes = objects
                    .read(&blob)?
                    .ok_or(StoreError::NotFound(blob))?
                    .into_blob()?;
                let dir = target.parent().unwrap_or(&self.root);
                fs::create_dir_all(dir)?;
                write_atomically(dir, &target, &bytes)?;
                debug!(path = %path, size = bytes.len(), "checked out working file");
            }
            _ => {}
        }
        Ok(())
    }
}

fn is_reserved(path: &WikiPath) -> bool {
    path.segments().next() == Some(META_DIR)
}

impl InventorySink for InventoryFile {
    fn persist(
        &self,
        objects: &dyn ObjectStore,
        inventory: &Inventory,
        changes: &[Change],
    ) -> StoreResult<()> {
        if let Some(change) = changes.iter().find(|c| is_reserved(&c.path)) {
            return Err(StoreError::ReservedPath(change.path.clone()));
        }
        for change in changes {
            self.check_out(objects, inventory, &change.path)?;
        }
        self.save(inventory)
    }
}

/// A working tree whose committed state lives under a directory.
pub struct DiskTree {
    root: PathBuf,
    objects: DiskObjectStore,
    file: InventoryFile,
    inventory: RwLock<Inventory>,
}

impl DiskTree {
    fn layout(root: &Path) -> StoreResult<(DiskObjectStore, InventoryFile)> {
        let meta = root.join(META_DIR);
        let objects = DiskObjectStore::open(meta.join(OBJECTS_DIR))?;
        let file = InventoryFile {
            root: root.to_path_buf(),
            path: meta.join(INVENTORY_FILE),
            dir: meta,
        };
        Ok((objects, file))
    }

    /// Create a new, empty working tree at `root`.
    ///
    /// Fails if `root` already holds a working tree.
    pub fn init(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        let meta = root.join(META_DIR);
        if meta.join(INVENTORY_FILE).exists() {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("working tree already exists at {}", root.display()),
            )));
        }
        let (objects, file) = Self::layout(&root)?;
        let inventory = Inventory::new();
        file.save(&inventory)?;
        info!(root = %root.display(), "initialized working tree");
        Ok(Self {
            root,
            objects,
            file,
            inventory: RwLock::new(inventory),
        })
    }

    /// Open an existing working tree at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        if !root.join(META_DIR).join(INVENTORY_FILE).is_file() {
            return Err(StoreError::NotAWorkingTree(root.display().to_string()));
        }
        let (objects, file) = Self::layout(&root)?;
        let inventory = file.load()?;
        debug!(root = %root.display(), entries = inventory.len(), "opened working tree");
        Ok(Self {
            root,
            objects,
            file,
            inventory: RwLock::new(inventory),
        })
    }

    /// Open the working tree at `root`, creating it if needed.
    pub fn open_or_init(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        if root.join(META_DIR).join(INVENTORY_FILE).is_file() {
            Self::open(root)
        } else {
            Self::init(root)
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl WorkingTree for DiskTree {
    type ReadScope<'a> = ReadScope<'a>;
    type WriteScope<'a> = WriteScope<'a>;

    fn lock_read(&self) -> StoreResult<ReadScope<'_>> {
        let guard = self
            .inventory
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(ReadScope::new(&self.objects, guard))
    }

    fn lock_write(&self) -> StoreResult<WriteScope<'_>> {
        let guard = self
            .inventory
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(WriteScope::new(&self.objects, &self.file, guard))
    }
}

impl std::fmt::Debug for DiskTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskTree").field("root", &self.root).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{TreeRead, TreeWrite};
    use wikkid_types::{Author, EntryKind, WikiPath};

    fn path(s: &str) -> WikiPath {
        WikiPath::parse(s).unwrap()
    }

    fn author() -> Author {
        Author::new("Disk", "disk@example.com")
    }

    fn add_file(tree: &DiskTree, p: &str, content: &[u8]) {
        let p = path(p);
        let mut scope = tree.lock_write().unwrap();
        if let Some(parent) = p.parent() {
            scope.create_prefix(&parent).unwrap();
        }
        scope.put_bytes(&p, content).unwrap();
        scope.add_path(&p).unwrap();
        scope.commit("add", &author()).unwrap();
    }

    #[test]
    fn object_store_roundtrip_and_dedup() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskObjectStore::open(dir.path().join("objects")).unwrap();
        let obj = StoredObject::blob(&b"on disk"[..]);
        let id = store.write(&obj).unwrap();
        assert_eq!(store.write(&obj).unwrap(), id);
        assert!(store.exists(&id).unwrap());
        assert_eq!(store.read(&id).unwrap().unwrap(), obj);
        assert!(store.read(&ObjectId::from_bytes(b"missing")).unwrap().is_none());
    }

    #[test]
    fn object_store_detects_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskObjectStore::open(dir.path()).unwrap();
        let id = store
            .write(&StoredObject::blob(&b"pristine"[..]))
            .unwrap();
        fs::write(dir.path().join(id.to_hex()), b"blob\ntampered").unwrap();
        assert!(matches!(
            store.read(&id),
            Err(StoreError::HashMismatch { .. })
        ));

        fs::write(dir.path().join(id.to_hex()), b"no header").unwrap();
        assert!(matches!(
            store.read(&id),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn init_then_reopen_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let (id, head) = {
            let tree = DiskTree::init(dir.path()).unwrap();
            add_file(&tree, "docs/page.txt", b"persisted");
            let scope = tree.lock_read().unwrap();
            (scope.path_to_id(&path("docs/page.txt")).unwrap(), scope.head())
        };

        let tree = DiskTree::open(dir.path()).unwrap();
        let scope = tree.lock_read().unwrap();
        assert_eq!(scope.path_to_id(&path("docs/page.txt")), Some(id));
        assert_eq!(scope.read_content(&id).unwrap(), b"persisted");
        assert_eq!(scope.head(), head);
        let docs = scope.path_to_id(&path("docs")).unwrap();
        assert_eq!(scope.kind(&docs), EntryKind::Directory);
        assert_eq!(scope.revisions(10).unwrap().len(), 1);
    }

    #[test]
    fn commits_check_out_working_files() {
        let dir = tempfile::tempdir().unwrap();
        let tree = DiskTree::init(dir.path()).unwrap();
        add_file(&tree, "notes/today", b"first draft");
        assert!(dir.path().join("notes").is_dir());
        assert_eq!(fs::read(dir.path().join("notes/today")).unwrap(), b"first draft");

        {
            let mut scope = tree.lock_write().unwrap();
            scope.put_bytes(&path("notes/today"), b"second draft").unwrap();
            scope.commit("edit", &author()).unwrap();
        }
        assert_eq!(fs::read(dir.path().join("notes/today")).unwrap(), b"second draft");

        {
            let mut scope = tree.lock_write().unwrap();
            scope.create_prefix(&path("lib")).unwrap();
            scope.add_path(&path("lib")).unwrap();
            scope.commit("add lib", &author()).unwrap();
        }
        assert!(dir.path().join("lib").is_dir());
    }

    #[test]
    fn metadata_directory_is_not_a_wiki_path() {
        let dir = tempfile::tempdir().unwrap();
        let tree = DiskTree::init(dir.path()).unwrap();
        let inventory = fs::read(dir.path().join(META_DIR).join(INVENTORY_FILE)).unwrap();
        {
            let mut scope = tree.lock_write().unwrap();
            let target = path(".wikkid/inventory.json");
            scope.create_prefix(&path(".wikkid")).unwrap();
            scope.put_bytes(&target, b"clobbered").unwrap();
            scope.add_path(&target).unwrap();
            assert!(matches!(
                scope.commit("sneaky", &author()),
                Err(StoreError::ReservedPath(p)) if p == path(".wikkid")
            ));
        }
        assert_eq!(
            fs::read(dir.path().join(META_DIR).join(INVENTORY_FILE)).unwrap(),
            inventory
        );
        let scope = tree.lock_read().unwrap();
        assert!(scope.head().is_none());
        assert!(scope.path_to_id(&path(".wikkid")).is_none());
    }

    #[test]
    fn init_refuses_existing_tree() {
        let dir = tempfile::tempdir().unwrap();
        DiskTree::init(dir.path()).unwrap();
        assert!(DiskTree::init(dir.path()).is_err());
        assert!(DiskTree::open_or_init(dir.path()).is_ok());
    }

    #[test]
    fn open_requires_a_tree() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DiskTree::open(dir.path()),
            Err(StoreError::NotAWorkingTree(_))
        ));
    }

    #[test]
    fn uncommitted_changes_do_not_reach_disk() {
        let dir = tempfile::tempdir().unwrap();
        {
            let tree = DiskTree::init(dir.path()).unwrap();
            let mut scope = tree.lock_write().unwrap();
            scope.put_bytes(&path("draft"), b"unsaved").unwrap();
            scope.add_path(&path("draft")).unwrap();
        }
        let tree = DiskTree::open(dir.path()).unwrap();
        let scope = tree.lock_read().unwrap();
        assert!(scope.path_to_id(&path("draft")).is_none());
        assert!(scope.head().is_none());
    }
}
