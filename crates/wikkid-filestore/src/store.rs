use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};
use wikkid_store::{Revision, TreeRead, TreeWrite, WorkingTree};
use wikkid_types::{Author, EntryKind, FileId, RevisionId, WikiPath};

use crate::config::{ConflictPolicy, FileStoreConfig};
use crate::error::{FileStoreError, FileStoreResult};
use crate::file::File;

/// Fail with `FileExists` at the first prefix of `path`, root first, that is
/// versioned as something other than a directory.
fn check_directory_shape<S: TreeRead>(scope: &S, path: &WikiPath) -> FileStoreResult<()> {
    for prefix in path.prefixes() {
        let Some(id) = scope.path_to_id(&prefix) else {
            // Nothing below an absent prefix can exist.
            return Ok(());
        };
        if scope.kind(&id) != EntryKind::Directory {
            return Err(FileStoreError::FileExists { path: prefix });
        }
    }
    Ok(())
}

/// Maps wiki paths onto a version-controlled working tree.
///
/// Reads take a short shared scope; `update_file` holds the exclusive scope
/// for the whole check-write-commit sequence, so each call produces exactly
/// one revision or none at all.
pub struct FileStore<T: WorkingTree> {
    tree: Arc<T>,
    config: FileStoreConfig,
}

impl<T: WorkingTree> FileStore<T> {
    /// Wrap a working tree with the default configuration.
    pub fn new(tree: Arc<T>) -> Self {
        Self::with_config(tree, FileStoreConfig::default())
    }

    pub fn with_config(tree: Arc<T>, config: FileStoreConfig) -> Self {
        Self { tree, config }
    }

    pub fn tree(&self) -> &Arc<T> {
        &self.tree
    }

    pub fn config(&self) -> &FileStoreConfig {
        &self.config
    }

    /// Look up the entry at `path`, or `None` if nothing is versioned there.
    pub fn get(&self, path: &str) -> FileStoreResult<Option<File<T>>> {
        let entry = self.entry(path)?;
        Ok(entry.file_id().is_some().then_some(entry))
    }

    /// Like [`FileStore::get`] but always returns a handle; absent paths
    /// yield an entry of kind [`EntryKind::Absent`].
    pub fn entry(&self, path: &str) -> FileStoreResult<File<T>> {
        let path = WikiPath::parse(path)?;
        let file_id = self.tree.lock_read()?.path_to_id(&path);
        debug!(path = %path, found = file_id.is_some(), "resolved path");
        Ok(File::new(Arc::clone(&self.tree), path, file_id))
    }

    /// Write `content` at `path` as a single commit.
    ///
    /// An unversioned path is added along with any missing parent
    /// directories. A versioned file is overwritten under its existing
    /// identity, subject to the configured [`ConflictPolicy`]: by default
    /// `parent_revision` must equal the entry's
    /// [`File::last_modified`]. `message` falls back to
    /// [`FileStoreConfig::default_commit_message`].
    pub fn update_file(
        &self,
        path: &str,
        content: &[u8],
        author: &Author,
        parent_revision: Option<RevisionId>,
        message: Option<&str>,
    ) -> FileStoreResult<RevisionId> {
        let path = WikiPath::parse_non_root(path)?;
        self.check_depth(&path)?;
        let message = message.unwrap_or(&self.config.default_commit_message);

        let mut scope = self.tree.lock_write()?;
        let revision = match scope.path_to_id(&path) {
            None => Self::add_file(&mut scope, &path, content, author, message)?,
            Some(id) => self.replace_file(
                &mut scope,
                &path,
                id,
                content,
                author,
                parent_revision,
                message,
            )?,
        };
        info!(
            path = %path,
            revision = %revision.short_id(),
            bytes = content.len(),
            author = %author,
            "updated file"
        );
        Ok(revision)
    }

    fn add_file<S: TreeWrite>(
        scope: &mut S,
        path: &WikiPath,
        content: &[u8],
        author: &Author,
        message: &str,
    ) -> FileStoreResult<RevisionId> {
        let parent = path.parent().unwrap_or_else(WikiPath::root);
        check_directory_shape(&*scope, &parent)?;
        scope.create_prefix(&parent)?;
        scope.put_bytes(path, content)?;
        let id = scope.add_path(path)?;
        debug!(path = %path, file_id = %id.short_id(), "adding new file");
        Ok(scope.commit(message, author)?)
    }

    #[allow(clippy::too_many_arguments)]
    fn replace_file<S: TreeWrite>(
        &self,
        scope: &mut S,
        path: &WikiPath,
        id: FileId,
        content: &[u8],
        author: &Author,
        parent_revision: Option<RevisionId>,
        message: &str,
    ) -> FileStoreResult<RevisionId> {
        if scope.kind(&id) == EntryKind::Directory {
            return Err(FileStoreError::IsADirectory { path: path.clone() });
        }
        if self.config.conflict_policy == ConflictPolicy::RejectStale {
            let actual = scope.last_changed(&id)?;
            if parent_revision != actual {
                warn!(
                    path = %path,
                    expected = ?parent_revision.map(|r| r.short_id()),
                    actual = ?actual.map(|r| r.short_id()),
                    "rejecting stale update"
                );
                return Err(FileStoreError::Conflict {
                    path: path.clone(),
                    expected: parent_revision,
                    actual,
                });
            }
        }
        scope.put_bytes(path, content)?;
        Ok(scope.commit(message, author)?)
    }

    /// Fail with `FileExists` if any prefix of `path` is a file.
    ///
    /// Every prefix, from the top-level segment down to `path` itself, must
    /// be a directory or unversioned.
    pub fn ensure_directory_or_absent(&self, path: &WikiPath) -> FileStoreResult<()> {
        self.check_depth(path)?;
        let scope = self.tree.lock_read()?;
        check_directory_shape(&scope, path)
    }

    /// Newest-first revision log, at most `limit` entries.
    pub fn history(&self, limit: usize) -> FileStoreResult<Vec<Revision>> {
        Ok(self.tree.lock_read()?.revisions(limit)?)
    }

    /// The newest revision, or `None` for a tree with no commits.
    pub fn head(&self) -> FileStoreResult<Option<RevisionId>> {
        Ok(self.tree.lock_read()?.head())
    }

    fn check_depth(&self, path: &WikiPath) -> FileStoreResult<()> {
        let depth = path.depth();
        if depth > self.config.max_path_depth {
            return Err(FileStoreError::PathTooDeep {
                path: path.clone(),
                depth,
                limit: self.config.max_path_depth,
            });
        }
        Ok(())
    }
}

impl<T: WorkingTree> Clone for FileStore<T> {
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            config: self.config.clone(),
        }
    }
}

impl<T: WorkingTree + fmt::Debug> fmt::Debug for FileStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore")
            .field("tree", &self.tree)
            .field("config", &self.config)
            .finish()
    }
}
