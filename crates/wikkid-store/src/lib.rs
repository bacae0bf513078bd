//! Versioned working-tree backend for the Wikkid wiki.
//!
//! This crate is the version-control layer the content store sits on. It
//! resolves paths to stable identities, reads committed content, stages
//! single-path changes and commits them as revisions, all under shared or
//! exclusive scoped locks.
//!
//! # Object Types
//!
//! - blob -- raw file content, held as a [`StoredObject`]
//! - [`Manifest`] -- sorted listing of every versioned path at a revision
//! - [`RevisionObject`] -- one commit: parent, author, message, changes
//!
//! # Working Trees
//!
//! All working trees implement [`WorkingTree`], which hands out a
//! [`TreeRead`] scope (shared) or a [`TreeWrite`] scope (exclusive):
//!
//! - [`VolatileTree`] -- in-memory, for tests and embedding
//! - [`DiskTree`] -- persisted under `<root>/.wikkid/`
//!
//! # Design Rules
//!
//! 1. Objects are immutable and content-addressed.
//! 2. Staged changes become visible only when `commit` succeeds; a dropped
//!    write scope discards them.
//! 3. Readers share a tree; a writer excludes everyone.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod disk;
pub mod error;
pub mod hasher;
pub mod inventory;
pub mod memory;
pub mod object;
pub mod scope;
pub mod text;
pub mod traits;
pub mod volatile;

pub use disk::{DiskObjectStore, DiskTree};
pub use error::{StoreError, StoreResult};
pub use hasher::ContentHasher;
pub use inventory::{Inventory, InventoryEntry};
pub use memory::InMemoryObjectStore;
pub use object::{
    Change, ChangeAction, Manifest, ManifestEntry, ObjectKind, Record, Revision, RevisionObject,
    StoredObject,
};
pub use scope::{ReadScope, WriteScope};
pub use traits::{ObjectStore, TreeRead, TreeWrite, WorkingTree};
pub use volatile::VolatileTree;
