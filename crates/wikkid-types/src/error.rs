use thiserror::Error;

/// Rejected input for one of the identity or path types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("{input:?} is not an object id: {reason}")]
    InvalidId { input: String, reason: String },

    #[error("{input:?} is not a file id: {reason}")]
    InvalidFileId { input: String, reason: String },

    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("path {path:?} is {depth} segments deep (limit {limit})")]
    PathTooDeep {
        path: String,
        depth: usize,
        limit: usize,
    },

    #[error("invalid author {0:?}: expected `Name <email>`")]
    InvalidAuthor(String),
}
