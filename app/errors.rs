use bootstrap::BootstrapError;
use ::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("bootstrap error: {0}")]
    BootstrapError(#[from] BootstrapError),
}

pub(crate) type AppResult<T> = Result<T, AppError>;
