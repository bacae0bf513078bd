use wikkid_store::StoreError;
use wikkid_types::{RevisionId, TypeError, WikiPath};

/// Errors from content store operations.
///
/// Directory-shape violations (pick a different path) and backend failures
/// (retry or report) are separate variants; see
/// [`FileStoreError::is_directory_shape`].
#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    /// A file occupies a path that would have to be a directory.
    #[error("{path} exists and is not a directory")]
    FileExists { path: WikiPath },

    /// File content was written to a path that is a directory.
    #[error("{path} is a directory")]
    IsADirectory { path: WikiPath },

    /// The caller's parent revision is not the entry's latest revision.
    #[error("{path} changed since revision {}", fmt_revision(.expected))]
    Conflict {
        path: WikiPath,
        expected: Option<RevisionId>,
        actual: Option<RevisionId>,
    },

    /// The operation is deliberately unsupported at this entry point.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// The path is deeper than the store allows.
    #[error("{path} is {depth} segments deep (limit {limit})")]
    PathTooDeep {
        path: WikiPath,
        depth: usize,
        limit: usize,
    },

    /// The path failed to parse.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] TypeError),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),

    /// The versioned backend failed (I/O, locking, corruption).
    #[error("backend error: {0}")]
    Store(#[from] StoreError),
}

fn fmt_revision(rev: &Option<RevisionId>) -> String {
    rev.map(|r| r.short_id()).unwrap_or_else(|| "<none>".into())
}

impl FileStoreError {
    /// Returns `true` for errors that mean "pick a different path".
    pub fn is_directory_shape(&self) -> bool {
        matches!(self, Self::FileExists { .. } | Self::IsADirectory { .. })
    }

    /// Returns `true` for failures of the versioned backend.
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// Result alias for content store operations.
pub type FileStoreResult<T> = Result<T, FileStoreError>;
