use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("file store error: {0}")]
    FileStore(#[from] wikkid_filestore::FileStoreError),

    #[error("capability hierarchy error: {0}")]
    Hierarchy(#[from] wikkid_dispatch::HierarchyError),

    #[error("view registration error: {0}")]
    Registration(#[from] wikkid_dispatch::RegistrationError),

    #[error("backend error: {0}")]
    Store(#[from] wikkid_store::StoreError),
}

pub type SdkResult<T> = Result<T, SdkError>;
