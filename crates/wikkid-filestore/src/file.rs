use std::fmt;
use std::sync::Arc;

use wikkid_store::{TreeRead, WorkingTree};
use wikkid_types::{Author, EntryKind, FileId, RevisionId, WikiPath};

use crate::error::{FileStoreError, FileStoreResult};

/// A handle to one path's current versioned state.
///
/// The handle stores only the path and the identity it resolved to. Every
/// query takes a short shared scope on the working tree, so answers always
/// reflect the latest commit rather than the state at construction.
pub struct File<T: WorkingTree> {
    tree: Arc<T>,
    path: WikiPath,
    file_id: Option<FileId>,
}

impl<T: WorkingTree> File<T> {
    pub(crate) fn new(tree: Arc<T>, path: WikiPath, file_id: Option<FileId>) -> Self {
        Self {
            tree,
            path,
            file_id,
        }
    }

    pub fn path(&self) -> &WikiPath {
        &self.path
    }

    /// Backend identity, or `None` for an absent entry.
    pub fn file_id(&self) -> Option<FileId> {
        self.file_id
    }

    pub fn kind(&self) -> FileStoreResult<EntryKind> {
        let Some(id) = self.file_id else {
            return Ok(EntryKind::Absent);
        };
        let scope = self.tree.lock_read()?;
        Ok(scope.kind(&id))
    }

    /// The full file content.
    ///
    /// `None` for absent entries and directories.
    pub fn content(&self) -> FileStoreResult<Option<Vec<u8>>> {
        let Some(id) = self.file_id else {
            return Ok(None);
        };
        let scope = self.tree.lock_read()?;
        if scope.kind(&id) != EntryKind::File {
            return Ok(None);
        }
        Ok(Some(scope.read_content(&id)?))
    }

    pub fn is_directory(&self) -> FileStoreResult<bool> {
        Ok(self.kind()?.is_directory())
    }

    /// Directories are binary. Files are binary when their content fails the
    /// text check (a NUL byte anywhere). Absent entries are not binary.
    pub fn is_binary(&self) -> FileStoreResult<bool> {
        let Some(id) = self.file_id else {
            return Ok(false);
        };
        let scope = self.tree.lock_read()?;
        match scope.kind(&id) {
            EntryKind::Directory => Ok(true),
            EntryKind::File => Ok(!scope.is_text(&id)?),
            EntryKind::Absent => Ok(false),
        }
    }

    /// Revision that last added or modified this entry.
    ///
    /// Pass it back as the parent revision of the next update.
    pub fn last_modified(&self) -> FileStoreResult<Option<RevisionId>> {
        let Some(id) = self.file_id else {
            return Ok(None);
        };
        let scope = self.tree.lock_read()?;
        if scope.kind(&id) == EntryKind::Absent {
            return Ok(None);
        }
        Ok(scope.last_changed(&id)?)
    }

    /// Names and kinds of a directory's children; empty for anything else.
    pub fn children(&self) -> FileStoreResult<Vec<(String, EntryKind)>> {
        if self.file_id.is_none() {
            return Ok(Vec::new());
        }
        let scope = self.tree.lock_read()?;
        match self.file_id.map(|id| scope.kind(&id)) {
            Some(EntryKind::Directory) => Ok(scope.children(&self.path)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Entry-level writes are not supported; go through
    /// [`crate::FileStore::update_file`].
    pub fn update(&self, _content: &[u8], _user: &Author) -> FileStoreResult<RevisionId> {
        Err(FileStoreError::NotImplemented("File::update"))
    }
}

impl<T: WorkingTree> Clone for File<T> {
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            path: self.path.clone(),
            file_id: self.file_id,
        }
    }
}

impl<T: WorkingTree> fmt::Debug for File<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("path", &self.path)
            .field("file_id", &self.file_id)
            .finish()
    }
}
