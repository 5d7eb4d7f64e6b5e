use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaHttpError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("http connection error: {0}")]
    Http(#[from] hyper::Error),
}

pub type MediaHttpResult<T> = Result<T, MediaHttpError>;
