//! Content store for the Wikkid wiki.
//!
//! [`FileStore`] maps wiki paths onto a [`wikkid_store::WorkingTree`] and
//! hands out [`File`] entries that answer content and classification
//! queries lazily. Every write goes through [`FileStore::update_file`],
//! which adds or replaces one path as exactly one revision.
//!
//! ```
//! use std::sync::Arc;
//! use wikkid_filestore::FileStore;
//! use wikkid_store::VolatileTree;
//! use wikkid_types::Author;
//!
//! let store = FileStore::new(Arc::new(VolatileTree::new()));
//! let author = Author::new("Ada", "ada@example.com");
//! store.update_file("FrontPage", b"Welcome!", &author, None, None).unwrap();
//!
//! let page = store.get("FrontPage").unwrap().unwrap();
//! assert_eq!(page.content().unwrap().unwrap(), b"Welcome!");
//! assert!(!page.is_binary().unwrap());
//! ```

pub mod config;
pub mod error;
pub mod file;
pub mod store;

pub use config::{ConflictPolicy, FileStoreConfig};
pub use error::{FileStoreError, FileStoreResult};
pub use file::File;
pub use store::FileStore;
