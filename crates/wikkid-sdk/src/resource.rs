//! Classification of store entries into dispatchable resources.

use std::fmt;

use wikkid_dispatch::{Advertises, Capability, CapabilityHierarchy, HierarchyError};
use wikkid_filestore::{File, FileStoreResult};
use wikkid_store::WorkingTree;
use wikkid_types::{EntryKind, WikiPath};

/// The built-in capability tags.
pub mod capabilities {
    use wikkid_dispatch::Capability;

    pub const RESOURCE: Capability = Capability::new("resource");
    pub const MISSING: Capability = Capability::new("missing-resource");
    pub const DIRECTORY: Capability = Capability::new("directory");
    pub const FILE: Capability = Capability::new("file");
    pub const BINARY_FILE: Capability = Capability::new("binary-file");
    pub const TEXT_FILE: Capability = Capability::new("text-file");
    pub const WIKI_PAGE: Capability = Capability::new("wiki-page");
}

/// The hierarchy every wiki resource is classified into.
///
/// ```text
/// resource
/// ├── missing-resource
/// ├── directory
/// └── file
///     ├── binary-file
///     └── text-file
///         └── wiki-page
/// ```
pub fn standard_hierarchy() -> Result<CapabilityHierarchy, HierarchyError> {
    use capabilities::*;

    Ok(CapabilityHierarchy::builder()
        .declare(RESOURCE, &[])?
        .declare(MISSING, &[RESOURCE])?
        .declare(DIRECTORY, &[RESOURCE])?
        .declare(FILE, &[RESOURCE])?
        .declare(BINARY_FILE, &[FILE])?
        .declare(TEXT_FILE, &[FILE])?
        .declare(WIKI_PAGE, &[TEXT_FILE])?
        .build())
}

/// What kind of resource an entry is, for dispatch purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Missing,
    Directory,
    BinaryFile,
    TextFile,
    /// A text file named with a `.txt` extension or none at all.
    WikiPage,
}

impl ResourceKind {
    /// Classify from the entry kind, the binary check and the path.
    pub fn classify(kind: EntryKind, is_binary: bool, path: &WikiPath) -> Self {
        match kind {
            EntryKind::Absent => Self::Missing,
            EntryKind::Directory => Self::Directory,
            EntryKind::File if is_binary => Self::BinaryFile,
            EntryKind::File => match path.extension() {
                None | Some("txt") => Self::WikiPage,
                Some(_) => Self::TextFile,
            },
        }
    }

    pub fn capability(self) -> Capability {
        match self {
            Self::Missing => capabilities::MISSING,
            Self::Directory => capabilities::DIRECTORY,
            Self::BinaryFile => capabilities::BINARY_FILE,
            Self::TextFile => capabilities::TEXT_FILE,
            Self::WikiPage => capabilities::WIKI_PAGE,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.capability().as_str())
    }
}

/// Best-effort content type from the file extension.
pub fn mimetype(path: &WikiPath, kind: ResourceKind) -> &'static str {
    let ext = path.extension().map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        _ => match kind {
            ResourceKind::BinaryFile => "application/octet-stream",
            ResourceKind::Directory | ResourceKind::Missing => "text/html",
            ResourceKind::TextFile | ResourceKind::WikiPage => "text/plain",
        },
    }
}

/// An entry together with its classification.
pub struct Resource<T: WorkingTree> {
    file: File<T>,
    kind: ResourceKind,
}

impl<T: WorkingTree> Resource<T> {
    /// Classify `file` against the current state of the store.
    pub fn from_file(file: File<T>) -> FileStoreResult<Self> {
        let entry_kind = file.kind()?;
        let is_binary = entry_kind.is_file() && file.is_binary()?;
        let kind = ResourceKind::classify(entry_kind, is_binary, file.path());
        Ok(Self { file, kind })
    }

    pub fn file(&self) -> &File<T> {
        &self.file
    }

    pub fn into_file(self) -> File<T> {
        self.file
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn path(&self) -> &WikiPath {
        self.file.path()
    }

    /// The last path segment; empty for the root.
    pub fn title(&self) -> &str {
        self.path().file_name().unwrap_or("")
    }

    pub fn mimetype(&self) -> &'static str {
        mimetype(self.path(), self.kind)
    }
}

impl<T: WorkingTree> Advertises for Resource<T> {
    fn capability(&self) -> Capability {
        self.kind.capability()
    }
}

impl<T: WorkingTree> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("path", self.path())
            .field("kind", &self.kind)
            .finish()
    }
}
