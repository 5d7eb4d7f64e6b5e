use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RtmpIngestError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),
    #[error("rtmp session error: {0}")]
    SessionError(String),
}

pub type RtmpIngestResult<T> = Result<T, RtmpIngestError>;
