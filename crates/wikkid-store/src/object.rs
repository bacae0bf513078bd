use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wikkid_types::{Author, EntryKind, FileId, ObjectId, RevisionId, WikiPath};

use crate::error::{StoreError, StoreResult};
use crate::hasher::ContentHasher;

/// What a stored object holds. Also the header line of on-disk objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Page or attachment bytes, uninterpreted.
    Blob,
    Manifest,
    Revision,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 3] = [Self::Blob, Self::Manifest, Self::Revision];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Manifest => "manifest",
            Self::Revision => "revision",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-tagged bytes as an [`crate::ObjectStore`] keeps them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub data: Vec<u8>,
    pub size: u64,
}

impl StoredObject {
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        Self {
            kind,
            size: data.len() as u64,
            data,
        }
    }

    /// Wrap file content.
    pub fn blob(content: impl Into<Vec<u8>>) -> Self {
        Self::new(ObjectKind::Blob, content.into())
    }

    /// Unwrap file content, failing if this is some other kind of object.
    pub fn into_blob(self) -> StoreResult<Vec<u8>> {
        self.ensure_kind(ObjectKind::Blob)?;
        Ok(self.data)
    }

    pub fn compute_id(&self) -> ObjectId {
        ContentHasher::for_kind(self.kind).hash(&self.data)
    }

    fn ensure_kind(&self, wanted: ObjectKind) -> StoreResult<()> {
        if self.kind == wanted {
            Ok(())
        } else {
            Err(StoreError::CorruptObject {
                id: self.compute_id(),
                reason: format!("holds a {} where a {wanted} was expected", self.kind),
            })
        }
    }
}

/// A structured object stored as JSON under a fixed [`ObjectKind`].
pub trait Record: Serialize + DeserializeOwned {
    const KIND: ObjectKind;

    fn encode(&self) -> StoreResult<StoredObject> {
        let json = serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(Self::KIND, json))
    }

    fn decode(object: &StoredObject) -> StoreResult<Self> {
        object.ensure_kind(Self::KIND)?;
        serde_json::from_slice(&object.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

/// One versioned path as recorded in a [`Manifest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: WikiPath,
    pub file_id: FileId,
    pub kind: EntryKind,
    /// `None` for directories.
    pub blob: Option<ObjectId>,
}

/// Every versioned path at one revision, ordered by path so equal trees
/// hash equally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(mut entries: Vec<ManifestEntry>) -> Self {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Self { entries }
    }

    pub fn get(&self, path: &WikiPath) -> Option<&ManifestEntry> {
        let at = self.entries.binary_search_by(|e| e.path.cmp(path)).ok()?;
        self.entries.get(at)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Record for Manifest {
    const KIND: ObjectKind = ObjectKind::Manifest;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Added,
    Modified,
}

/// One path touched by a revision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub path: WikiPath,
    pub file_id: FileId,
    pub action: ChangeAction,
}

/// Revision record as persisted; its object id doubles as the [`RevisionId`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionObject {
    pub parent: Option<RevisionId>,
    pub author: Author,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub changes: Vec<Change>,
    pub manifest: ObjectId,
}

impl Record for RevisionObject {
    const KIND: ObjectKind = ObjectKind::Revision;
}

impl RevisionObject {
    pub fn into_revision(self, id: RevisionId) -> Revision {
        let RevisionObject {
            parent,
            author,
            message,
            timestamp,
            changes,
            manifest,
        } = self;
        Revision {
            id,
            parent,
            author,
            message,
            timestamp,
            changes,
            manifest,
        }
    }
}

/// A revision as handed to callers, id attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Revision {
    pub id: RevisionId,
    pub parent: Option<RevisionId>,
    pub author: Author,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub changes: Vec<Change>,
    pub manifest: ObjectId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> WikiPath {
        WikiPath::parse(s).unwrap()
    }

    #[test]
    fn blob_content_unwraps() {
        let obj = StoredObject::blob(&b"= Title ="[..]);
        assert_eq!(obj.size, 9);
        assert_eq!(obj.into_blob().unwrap(), b"= Title =");
    }

    #[test]
    fn manifest_is_not_a_blob() {
        let obj = Manifest::new(Vec::new()).encode().unwrap();
        assert!(matches!(
            obj.into_blob(),
            Err(StoreError::CorruptObject { .. })
        ));
        let page = StoredObject::blob(&b"{\"entries\":[]}"[..]);
        assert!(matches!(
            Manifest::decode(&page),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn manifest_lookup_by_path() {
        let manifest = Manifest::new(vec![
            ManifestEntry {
                path: path("lib/page.txt"),
                file_id: FileId::new(),
                kind: EntryKind::File,
                blob: Some(ObjectId::from_bytes(b"page")),
            },
            ManifestEntry {
                path: path("lib"),
                file_id: FileId::new(),
                kind: EntryKind::Directory,
                blob: None,
            },
        ]);
        assert_eq!(manifest.entries[0].path, path("lib"));
        assert_eq!(manifest.get(&path("lib/page.txt")).unwrap().kind, EntryKind::File);
        assert!(manifest.get(&path("README")).is_none());
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn revision_record_decodes_to_itself() {
        let record = RevisionObject {
            parent: None,
            author: Author::new("Jane", "jane@example.com"),
            message: "Hello world.".into(),
            timestamp: Utc::now(),
            changes: vec![Change {
                path: path("README"),
                file_id: FileId::new(),
                action: ChangeAction::Added,
            }],
            manifest: ObjectId::from_bytes(b"manifest"),
        };
        let stored = record.encode().unwrap();
        assert_eq!(stored.kind, ObjectKind::Revision);
        assert_eq!(RevisionObject::decode(&stored).unwrap(), record);

        let id = RevisionId::new(stored.compute_id());
        let revision = record.into_revision(id);
        assert_eq!(revision.id, id);
        assert_eq!(revision.changes[0].action, ChangeAction::Added);
    }

    #[test]
    fn kind_is_part_of_the_id() {
        let ids: Vec<_> = ObjectKind::ALL
            .into_iter()
            .map(|kind| StoredObject::new(kind, b"same bytes".to_vec()).compute_id())
            .collect();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
    }

    #[test]
    fn kind_names_parse_back() {
        for kind in ObjectKind::ALL {
            assert_eq!(ObjectKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ObjectKind::parse("tree"), None);
    }
}
