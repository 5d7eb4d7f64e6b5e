use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Invalid or conflicting configuration. Fatal at startup.
    #[error("invalid ingest configuration: {0}")]
    Configuration(String),
    /// A listener could not be bound. Fatal: serving is this process's sole purpose.
    #[error("failed to bind {listener} listener: {source}")]
    ListenerBind {
        listener: &'static str,
        #[source]
        source: io::Error,
    },
}

pub type BootstrapResult<T> = Result<T, BootstrapError>;
