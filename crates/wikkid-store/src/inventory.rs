//! The inventory: the committed mapping from paths to versioned entries.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use wikkid_types::{EntryKind, FileId, ObjectId, RevisionId, WikiPath};

use crate::object::{Manifest, ManifestEntry};

/// One versioned path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub file_id: FileId,
    pub kind: EntryKind,
    /// Content blob of a file; `None` for directories.
    pub blob: Option<ObjectId>,
    /// Revision that added or last modified this entry.
    pub last_changed: Option<RevisionId>,
}

impl InventoryEntry {
    pub fn directory(file_id: FileId) -> Self {
        Self {
            file_id,
            kind: EntryKind::Directory,
            blob: None,
            last_changed: None,
        }
    }
}

/// Committed state of a working tree.
///
/// Always contains the root directory. Keeps a reverse index from file id to
/// path, rebuilt on deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "InventoryRecord", into = "InventoryRecord")]
pub struct Inventory {
    entries: BTreeMap<WikiPath, InventoryEntry>,
    by_id: HashMap<FileId, WikiPath>,
    head: Option<RevisionId>,
}

#[derive(Serialize, Deserialize)]
struct InventoryRecord {
    head: Option<RevisionId>,
    entries: BTreeMap<WikiPath, InventoryEntry>,
}

impl From<InventoryRecord> for Inventory {
    fn from(record: InventoryRecord) -> Self {
        let mut inventory = Self {
            entries: BTreeMap::new(),
            by_id: HashMap::new(),
            head: record.head,
        };
        for (path, entry) in record.entries {
            inventory.insert(path, entry);
        }
        inventory.ensure_root();
        inventory
    }
}

impl From<Inventory> for InventoryRecord {
    fn from(inventory: Inventory) -> Self {
        Self {
            head: inventory.head,
            entries: inventory.entries,
        }
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    /// An inventory holding only the root directory.
    pub fn new() -> Self {
        let mut inventory = Self {
            entries: BTreeMap::new(),
            by_id: HashMap::new(),
            head: None,
        };
        inventory.ensure_root();
        inventory
    }

    fn ensure_root(&mut self) {
        if !self.entries.contains_key(&WikiPath::root()) {
            self.insert(WikiPath::root(), InventoryEntry::directory(FileId::new()));
        }
    }

    pub fn get(&self, path: &WikiPath) -> Option<&InventoryEntry> {
        self.entries.get(path)
    }

    pub fn get_mut(&mut self, path: &WikiPath) -> Option<&mut InventoryEntry> {
        self.entries.get_mut(path)
    }

    pub fn path_of(&self, id: &FileId) -> Option<&WikiPath> {
        self.by_id.get(id)
    }

    pub fn insert(&mut self, path: WikiPath, entry: InventoryEntry) {
        if let Some(old) = self.entries.get(&path) {
            self.by_id.remove(&old.file_id);
        }
        self.by_id.insert(entry.file_id, path.clone());
        self.entries.insert(path, entry);
    }

    pub fn head(&self) -> Option<RevisionId> {
        self.head
    }

    pub fn set_head(&mut self, head: RevisionId) {
        self.head = Some(head);
    }

    /// Number of versioned paths, including the root.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WikiPath, &InventoryEntry)> {
        self.entries.iter()
    }

    /// Direct children of `dir`, sorted by name.
    pub fn children(&self, dir: &WikiPath) -> Vec<(String, EntryKind)> {
        self.entries
            .iter()
            .filter(|(path, _)| path.parent().as_ref() == Some(dir))
            .filter_map(|(path, entry)| Some((path.file_name()?.to_string(), entry.kind)))
            .collect()
    }

    /// Snapshot of every versioned path except the root.
    pub fn to_manifest(&self) -> Manifest {
        Manifest::new(
            self.entries
                .iter()
                .filter(|(path, _)| !path.is_root())
                .map(|(path, entry)| ManifestEntry {
                    path: path.clone(),
                    file_id: entry.file_id,
                    kind: entry.kind,
                    blob: entry.blob,
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> WikiPath {
        WikiPath::parse(s).unwrap()
    }

    fn file(blob: &[u8]) -> InventoryEntry {
        InventoryEntry {
            file_id: FileId::new(),
            kind: EntryKind::File,
            blob: Some(ObjectId::from_bytes(blob)),
            last_changed: None,
        }
    }

    #[test]
    fn new_inventory_has_root_directory() {
        let inv = Inventory::new();
        let root = inv.get(&WikiPath::root()).unwrap();
        assert_eq!(root.kind, EntryKind::Directory);
        assert_eq!(inv.path_of(&root.file_id), Some(&WikiPath::root()));
        assert!(inv.head().is_none());
        assert!(inv.to_manifest().is_empty());
    }

    #[test]
    fn insert_maintains_reverse_index() {
        let mut inv = Inventory::new();
        let entry = file(b"a");
        let id = entry.file_id;
        inv.insert(path("a"), entry);
        assert_eq!(inv.path_of(&id), Some(&path("a")));

        let replacement = file(b"b");
        let new_id = replacement.file_id;
        inv.insert(path("a"), replacement);
        assert!(inv.path_of(&id).is_none());
        assert_eq!(inv.path_of(&new_id), Some(&path("a")));
    }

    #[test]
    fn children_lists_direct_descendants_only() {
        let mut inv = Inventory::new();
        inv.insert(path("lib"), InventoryEntry::directory(FileId::new()));
        inv.insert(path("lib/a.txt"), file(b"a"));
        inv.insert(path("lib/sub"), InventoryEntry::directory(FileId::new()));
        inv.insert(path("lib/sub/deep.txt"), file(b"d"));
        inv.insert(path("README"), file(b"r"));

        let names: Vec<String> = inv
            .children(&path("lib"))
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["a.txt", "sub"]);
        assert_eq!(inv.children(&WikiPath::root()).len(), 2);
    }

    #[test]
    fn serde_rebuilds_reverse_index() {
        let mut inv = Inventory::new();
        let entry = file(b"content");
        let id = entry.file_id;
        inv.insert(path("docs/page"), entry);

        let json = serde_json::to_string(&inv).unwrap();
        let back: Inventory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inv);
        assert_eq!(back.path_of(&id), Some(&path("docs/page")));
    }
}
