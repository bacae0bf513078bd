//! High-level API for the Wikkid wiki.
//!
//! [`Wiki`] ties a [`wikkid_filestore::FileStore`] to a
//! [`wikkid_dispatch::Registry`]: it classifies each entry as a
//! [`Resource`], maps the resource to a capability in the
//! [standard hierarchy](resource::standard_hierarchy), and resolves the view
//! that should render it.
//!
//! ```
//! use std::sync::Arc;
//! use wikkid_sdk::{ResourceKind, ViewHandler, Wiki};
//! use wikkid_store::VolatileTree;
//! use wikkid_types::Author;
//!
//! let wiki = Wiki::new(Arc::new(VolatileTree::new()))?;
//! wiki.update_page("FrontPage", b"Hello", &Author::new("Ada", "ada@example.com"), None, None)?;
//!
//! assert_eq!(wiki.resource("FrontPage")?.kind(), ResourceKind::WikiPage);
//! let view = wiki.view_for("FrontPage", Some("edit"))?.expect("edit view");
//! assert_eq!(view.name(), Some("edit"));
//! # Ok::<(), wikkid_sdk::SdkError>(())
//! ```

pub mod error;
pub mod resource;
pub mod view;
pub mod wiki;

pub use error::{SdkError, SdkResult};
pub use resource::{capabilities, standard_hierarchy, Resource, ResourceKind};
pub use view::{standard_registry, standard_registry_builder, DynView, StandardView, STANDARD_VIEWS};
pub use wiki::{Dispatch, Wiki};

pub use wikkid_dispatch::{Capability, Registry, ViewHandler};
pub use wikkid_filestore::{ConflictPolicy, File, FileStore, FileStoreConfig, FileStoreError};
pub use wikkid_types::{Author, EntryKind, FileId, RevisionId, WikiPath};
