use std::sync::RwLock;

use wikkid_types::{Author, WikiPath};

use crate::error::{StoreError, StoreResult};
use crate::inventory::Inventory;
use crate::memory::InMemoryObjectStore;
use crate::scope::{NoPersist, ReadScope, WriteScope};
use crate::traits::{TreeWrite, WorkingTree};

/// A working tree that lives entirely in memory.
///
/// Used for tests and for embedding a throwaway wiki. Everything is lost
/// when the tree is dropped.
pub struct VolatileTree {
    objects: InMemoryObjectStore,
    inventory: RwLock<Inventory>,
}

impl VolatileTree {
    /// An empty tree holding only the root directory.
    pub fn new() -> Self {
        Self {
            objects: InMemoryObjectStore::new(),
            inventory: RwLock::new(Inventory::new()),
        }
    }

    /// Build a tree from `(path, content)` pairs in a single revision.
    ///
    /// `None` content creates a directory. An empty list records no revision.
    ///
    /// ```
    /// use wikkid_store::{TreeRead, VolatileTree, WorkingTree};
    /// use wikkid_types::WikiPath;
    ///
    /// let tree = VolatileTree::with_files([
    ///     ("README", Some(&b"Content"[..])),
    ///     ("lib", None),
    /// ]).unwrap();
    /// let scope = tree.lock_read().unwrap();
    /// assert!(scope.path_to_id(&WikiPath::parse("lib").unwrap()).is_some());
    /// ```
    pub fn with_files<'c, I, P>(files: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = (P, Option<&'c [u8]>)>,
        P: AsRef<str>,
    {
        let tree = Self::new();
        {
            let mut scope = tree.lock_write()?;
            for (raw, content) in files {
                let path = WikiPath::parse_non_root(raw.as_ref())?;
                match content {
                    Some(bytes) => {
                        if let Some(parent) = path.parent() {
                            scope.create_prefix(&parent)?;
                        }
                        scope.put_bytes(&path, bytes)?;
                    }
                    None => scope.create_prefix(&path)?,
                }
                scope.add_path(&path)?;
            }
            if !scope.is_clean() {
                scope.commit("Initial content.", &Author::new("Wikkid", "wikkid@localhost"))?;
            }
        }
        Ok(tree)
    }

    /// The backing object store.
    pub fn objects(&self) -> &InMemoryObjectStore {
        &self.objects
    }
}

impl Default for VolatileTree {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkingTree for VolatileTree {
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
        Ok(WriteScope::new(&self.objects, &NoPersist, guard))
    }
}

impl std::fmt::Debug for VolatileTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolatileTree")
            .field("objects", &self.objects)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ChangeAction;
    use crate::traits::TreeRead;
    use wikkid_types::EntryKind;

    fn path(s: &str) -> WikiPath {
        WikiPath::parse(s).unwrap()
    }

    fn author() -> Author {
        Author::new("Test", "test@example.com")
    }

    #[test]
    fn empty_tree_has_only_root() {
        let tree = VolatileTree::new();
        let scope = tree.lock_read().unwrap();
        let root = scope.path_to_id(&WikiPath::root()).unwrap();
        assert_eq!(scope.kind(&root), EntryKind::Directory);
        assert!(scope.head().is_none());
        assert!(scope.path_to_id(&path("README")).is_none());
    }

    #[test]
    fn fixture_builds_files_and_directories() {
        let tree = VolatileTree::with_files([
            ("README", Some(&b"Content"[..])),
            ("lib", None),
            ("docs/guide.txt", Some(&b"guide"[..])),
        ])
        .unwrap();
        let scope = tree.lock_read().unwrap();

        let readme = scope.path_to_id(&path("README")).unwrap();
        assert_eq!(scope.kind(&readme), EntryKind::File);
        assert_eq!(scope.read_content(&readme).unwrap(), b"Content");

        let lib = scope.path_to_id(&path("lib")).unwrap();
        assert_eq!(scope.kind(&lib), EntryKind::Directory);
        assert!(matches!(
            scope.read_content(&lib),
            Err(StoreError::NotAFile(_))
        ));

        let docs = scope.path_to_id(&path("docs")).unwrap();
        assert_eq!(scope.kind(&docs), EntryKind::Directory);
        assert_eq!(scope.revisions(10).unwrap().len(), 1);
    }

    #[test]
    fn empty_fixture_records_no_revision() {
        let tree = VolatileTree::with_files(Vec::<(&str, Option<&[u8]>)>::new()).unwrap();
        let scope = tree.lock_read().unwrap();
        assert!(scope.head().is_none());
        assert!(scope.revisions(10).unwrap().is_empty());
    }

    #[test]
    fn add_then_commit_records_one_revision() {
        let tree = VolatileTree::new();
        let rev = {
            let mut scope = tree.lock_write().unwrap();
            scope.create_prefix(&path("a/b")).unwrap();
            scope.put_bytes(&path("a/b/c.txt"), b"hello").unwrap();
            scope.add_path(&path("a/b/c.txt")).unwrap();
            scope.commit("add c", &author()).unwrap()
        };

        let scope = tree.lock_read().unwrap();
        assert_eq!(scope.head(), Some(rev));
        let revision = scope.revision(&rev).unwrap().unwrap();
        assert_eq!(revision.message, "add c");
        assert_eq!(revision.author, author());
        assert!(revision.parent.is_none());
        let added: Vec<_> = revision.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(added, vec!["a", "a/b", "a/b/c.txt"]);
        assert!(revision
            .changes
            .iter()
            .all(|c| c.action == ChangeAction::Added));

        let id = scope.path_to_id(&path("a/b/c.txt")).unwrap();
        assert_eq!(scope.last_changed(&id).unwrap(), Some(rev));
    }

    #[test]
    fn update_keeps_identity_and_chains_parent() {
        let tree = VolatileTree::with_files([("README", Some(&b"v1"[..]))]).unwrap();
        let (id_before, first) = {
            let scope = tree.lock_read().unwrap();
            (scope.path_to_id(&path("README")).unwrap(), scope.head().unwrap())
        };

        let second = {
            let mut scope = tree.lock_write().unwrap();
            scope.put_bytes(&path("README"), b"v2").unwrap();
            scope.commit("edit", &author()).unwrap()
        };

        let scope = tree.lock_read().unwrap();
        assert_eq!(scope.path_to_id(&path("README")), Some(id_before));
        assert_eq!(scope.read_content(&id_before).unwrap(), b"v2");
        let rev = scope.revision(&second).unwrap().unwrap();
        assert_eq!(rev.parent, Some(first));
        assert_eq!(rev.changes[0].action, ChangeAction::Modified);
        assert_eq!(scope.last_changed(&id_before).unwrap(), Some(second));

        let log = scope.revisions(10).unwrap();
        assert_eq!(log.iter().map(|r| r.id).collect::<Vec<_>>(), vec![second, first]);
        assert_eq!(scope.revisions(1).unwrap().len(), 1);
    }

    #[test]
    fn dropped_write_scope_discards_staged_changes() {
        let tree = VolatileTree::new();
        {
            let mut scope = tree.lock_write().unwrap();
            scope.create_prefix(&path("a")).unwrap();
            scope.put_bytes(&path("a/x"), b"x").unwrap();
            scope.add_path(&path("a/x")).unwrap();
            assert!(scope.path_to_id(&path("a/x")).is_some());
            assert!(!scope.is_clean());
        }
        let scope = tree.lock_read().unwrap();
        assert!(scope.path_to_id(&path("a/x")).is_none());
        assert!(scope.path_to_id(&path("a")).is_none());
        assert!(scope.head().is_none());
    }

    #[test]
    fn create_prefix_refuses_to_pass_through_a_file() {
        let tree = VolatileTree::with_files([("a", Some(&b"file"[..]))]).unwrap();
        let mut scope = tree.lock_write().unwrap();
        let err = scope.create_prefix(&path("a/b")).unwrap_err();
        assert!(matches!(err, StoreError::NotADirectory(p) if p == path("a")));
    }

    #[test]
    fn put_bytes_requires_existing_parent() {
        let tree = VolatileTree::new();
        let mut scope = tree.lock_write().unwrap();
        let err = scope.put_bytes(&path("missing/x"), b"x").unwrap_err();
        assert!(matches!(err, StoreError::MissingParent(_)));
    }

    #[test]
    fn put_bytes_refuses_directories() {
        let tree = VolatileTree::with_files([("lib", None)]).unwrap();
        let mut scope = tree.lock_write().unwrap();
        assert!(matches!(
            scope.put_bytes(&path("lib"), b"x"),
            Err(StoreError::NotAFile(_))
        ));
    }

    #[test]
    fn add_path_requires_working_content() {
        let tree = VolatileTree::new();
        let mut scope = tree.lock_write().unwrap();
        assert!(matches!(
            scope.add_path(&path("ghost")),
            Err(StoreError::NothingToAdd(_))
        ));
    }

    #[test]
    fn write_scope_reads_staged_content() {
        let tree = VolatileTree::with_files([("README", Some(&b"old"[..]))]).unwrap();
        let mut scope = tree.lock_write().unwrap();
        let id = scope.path_to_id(&path("README")).unwrap();
        scope.put_bytes(&path("README"), b"new").unwrap();
        assert_eq!(scope.read_content(&id).unwrap(), b"new");
    }

    #[test]
    fn children_of_directory() {
        let tree = VolatileTree::with_files([
            ("lib/a.txt", Some(&b"a"[..])),
            ("lib/sub", None),
        ])
        .unwrap();
        let scope = tree.lock_read().unwrap();
        let children = scope.children(&path("lib")).unwrap();
        assert_eq!(
            children,
            vec![
                ("a.txt".to_string(), EntryKind::File),
                ("sub".to_string(), EntryKind::Directory),
            ]
        );
        assert!(matches!(
            scope.children(&path("lib/a.txt")),
            Err(StoreError::NotADirectory(_))
        ));
    }

    #[test]
    fn is_text_uses_content() {
        let tree = VolatileTree::with_files([
            ("README", Some(&b"Content"[..])),
            ("image.png", Some(&b"some\0zero"[..])),
        ])
        .unwrap();
        let scope = tree.lock_read().unwrap();
        let readme = scope.path_to_id(&path("README")).unwrap();
        let image = scope.path_to_id(&path("image.png")).unwrap();
        assert!(scope.is_text(&readme).unwrap());
        assert!(!scope.is_text(&image).unwrap());
    }

    #[test]
    fn readers_share_the_tree() {
        use std::sync::Arc;
        use std::thread;

        let tree = Arc::new(VolatileTree::with_files([("README", Some(&b"x"[..]))]).unwrap());
        let outer = tree.lock_read().unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let tree = Arc::clone(&tree);
                thread::spawn(move || {
                    let scope = tree.lock_read().unwrap();
                    scope.path_to_id(&path("README")).is_some()
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        drop(outer);
    }
}
