use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("repository error: {0}")]
    Repo(#[from] bgit_repo::RepoError),

    #[error("store error: {0}")]
    Store(#[from] bgit_store::StoreError),

    #[error("index error: {0}")]
    Index(#[from] bgit_index::IndexError),

    #[error("ref error: {0}")]
    Ref(#[from] bgit_refs::RefError),
}

pub type SdkResult<T> = Result<T, SdkError>;
