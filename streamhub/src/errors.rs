use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamHubError {
    #[error("lifecycle event channel closed")]
    ChannelClosed,
}

pub type StreamHubResult<T> = Result<T, StreamHubError>;
