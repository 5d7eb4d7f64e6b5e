use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job {0} is already claimed")]
    AlreadyClaimed(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
