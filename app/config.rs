use std::{env, path::PathBuf};

use bootstrap::IngestConfig;
use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::{
    cli::AppCli,
    errors::{AppError, AppResult},
    util::parse_log_level,
};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct Logger {
    pub(crate) level: String,
    /// When set, logs also go to a daily-rolled file in this directory.
    pub(crate) dir: Option<PathBuf>,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            dir: None,
        }
    }
}

/// Credentials for the hosted-stream collaborators (status checks, uploads).
/// The bootstrap itself never calls out with them; they are only validated here.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Cloudflare {
    pub(crate) account_id: String,
    pub(crate) api_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) logger: Logger,
    #[serde(flatten)]
    pub(crate) ingest: IngestConfig,
    pub(crate) cloudflare: Option<Cloudflare>,
}

impl AppConfig {
    /// Defaults, then an optional config file, then `BLUETUBE_*` environment
    /// overrides. The config file is optional: the process boots fine from
    /// defaults alone.
    pub(crate) fn new(config_path: Option<String>) -> AppResult<Self> {
        let config_path_composed = config_path.or_else(|| env::var("BLUETUBE_CONFIG").ok());

        let mut builder = Config::builder();
        if let Some(path) = config_path_composed {
            builder = builder.add_source(File::with_name(path.as_str()));
        }
        let result = builder
            .add_source(Environment::with_prefix("bluetube").separator("__"))
            .build()?;
        let mut config: AppConfig = result.try_deserialize()?;

        // Platform convention: PORT is the status API bind port.
        if let Ok(port) = env::var("PORT") {
            config.ingest.status_api.port = port.parse().map_err(|_| {
                AppError::ConfigError(ConfigError::Message(format!(
                    "PORT is not a valid port number: {}",
                    port
                )))
            })?;
        }

        if config.cloudflare.is_none() {
            if let (Ok(account_id), Ok(api_token)) = (
                env::var("CLOUDFLARE_ACCOUNT_ID"),
                env::var("CLOUDFLARE_API_TOKEN"),
            ) {
                config.cloudflare = Some(Cloudflare {
                    account_id,
                    api_token,
                });
            }
        }

        Ok(config)
    }

    pub(crate) fn apply(&mut self, cli_args: AppCli) -> AppResult<()> {
        if let Some(level) = cli_args.log_level {
            self.logger.level = level;
        }

        if let Some(port) = cli_args.rtmp_port {
            self.ingest.rtmp.port = port;
        }

        if let Some(port) = cli_args.media_port {
            self.ingest.media_http.port = port;
        }

        if let Some(port) = cli_args.api_port {
            self.ingest.status_api.port = port;
        }

        Ok(())
    }

    pub(crate) fn validate(&self) -> AppResult<()> {
        let _ = parse_log_level(&self.logger.level)?;

        self.ingest.validate()?;

        if let Some(cloudflare) = &self.cloudflare {
            if cloudflare.account_id.is_empty() || cloudflare.api_token.is_empty() {
                return Err(AppError::ConfigError(ConfigError::Message(
                    "cloudflare credentials are incomplete: both account_id and api_token are required"
                        .to_owned(),
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.ingest.rtmp.port, 1935);
        assert_eq!(config.ingest.status_api.port, 3000);
    }

    #[test]
    fn incomplete_cloudflare_credentials_are_rejected() {
        let config = AppConfig {
            cloudflare: Some(Cloudflare {
                account_id: "acct".to_owned(),
                api_token: String::new(),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let config = AppConfig {
            logger: Logger {
                level: "shout".to_owned(),
                dir: None,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
