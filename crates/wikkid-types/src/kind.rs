use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a path in the working tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A regular file with byte content.
    File,
    /// A directory; has children but no content.
    Directory,
    /// Nothing is recorded at this path.
    Absent,
}

impl EntryKind {
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory)
    }

    pub fn exists(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_serde_agree() {
        for kind in [EntryKind::File, EntryKind::Directory, EntryKind::Absent] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn predicates() {
        assert!(EntryKind::File.is_file());
        assert!(EntryKind::Directory.is_directory());
        assert!(!EntryKind::Absent.exists());
        assert!(EntryKind::Directory.exists());
    }
}
