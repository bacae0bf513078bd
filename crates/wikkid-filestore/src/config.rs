use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FileStoreError, FileStoreResult};

/// How `update_file` treats the caller's parent revision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Reject an update unless the parent revision is the revision that
    /// last changed the entry (test-and-set).
    #[default]
    RejectStale,
    /// Overwrite unconditionally; the parent revision is ignored.
    LastWriterWins,
}

/// Configuration for a [`crate::FileStore`].
///
/// Every field has a default, so a TOML file only needs the keys it
/// changes:
///
/// ```toml
/// default_commit_message = "Edited via the wiki."
/// max_path_depth = 16
/// conflict_policy = "last-writer-wins"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    /// Commit message used when the caller supplies none.
    pub default_commit_message: String,
    /// Maximum number of segments in a path accepted by `update_file`.
    pub max_path_depth: usize,
    /// Parent-revision handling for updates of existing entries.
    pub conflict_policy: ConflictPolicy,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            default_commit_message: "Hello world.".into(),
            max_path_depth: 32,
            conflict_policy: ConflictPolicy::default(),
        }
    }
}

impl FileStoreConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> FileStoreResult<Self> {
        toml::from_str(s).map_err(|e| FileStoreError::Config(e.to_string()))
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> FileStoreResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| FileStoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> FileStoreResult<String> {
        toml::to_string(self).map_err(|e| FileStoreError::Config(e.to_string()))
    }
}
