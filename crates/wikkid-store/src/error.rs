use wikkid_types::{FileId, ObjectId, TypeError, WikiPath};

/// Failures of a working tree or its object store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    // Working tree shape.
    #[error("{0} is a file, expected a directory")]
    NotADirectory(WikiPath),

    #[error("{0} is a directory, expected a file")]
    NotAFile(WikiPath),

    #[error("cannot place {0}: its directory is not versioned")]
    MissingParent(WikiPath),

    /// `add_path` was called before any content was staged for the path.
    #[error("no staged content for {0}")]
    NothingToAdd(WikiPath),

    /// The path falls inside the working tree's metadata directory.
    #[error("{0} is reserved for working tree metadata")]
    ReservedPath(WikiPath),

    #[error("no versioned entry has file id {0}")]
    UnknownFile(FileId),

    // Object storage.
    #[error("no object {0} in the store")]
    NotFound(ObjectId),

    #[error("object {id} hashes to {computed} on read")]
    HashMismatch { id: ObjectId, computed: ObjectId },

    #[error("object {id} is unreadable: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    #[error("refusing to store an object under the null id")]
    NullObjectId,

    #[error("could not encode or decode a record: {0}")]
    Serialization(String),

    // Environment.
    #[error("{0} is not a wikkid working tree")]
    NotAWorkingTree(String),

    #[error("working tree lock poisoned: {0}")]
    LockPoisoned(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Type(#[from] TypeError),
}

pub type StoreResult<T> = Result<T, StoreError>;
