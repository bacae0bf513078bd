//! Foundation types for the Wikkid wiki store.
//!
//! This crate provides the identity and path types shared by every other
//! Wikkid crate. It has no knowledge of storage or rendering.
//!
//! # Key Types
//!
//! - [`WikiPath`] -- Normalized, root-relative, slash-separated path
//! - [`FileId`] -- Stable identity assigned to a path at first add (UUID v7)
//! - [`ObjectId`] -- Content-addressed identifier (BLAKE3 hash)
//! - [`RevisionId`] -- Identifier of one committed revision
//! - [`Author`] -- Opaque author descriptor forwarded to commits
//! - [`EntryKind`] -- File, directory or absent

pub mod author;
pub mod error;
pub mod file_id;
pub mod id;
pub mod kind;
pub mod path;

pub use author::Author;
pub use error::TypeError;
pub use file_id::FileId;
pub use id::{ObjectId, RevisionId};
pub use kind::EntryKind;
pub use path::WikiPath;
