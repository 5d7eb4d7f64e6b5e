use media_http::config::MediaHttpConfig;
use rtmp_ingest::config::RtmpIngestConfig;
use status_api::config::StatusApiConfig;

use crate::errors::{BootstrapError, BootstrapResult};

/// Everything the process serves, fixed at startup. Built once from file/env
/// defaults, validated, then owned by the bootstrap; never mutated afterwards.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub rtmp: RtmpIngestConfig,
    pub media_http: MediaHttpConfig,
    pub status_api: StatusApiConfig,
}

impl IngestConfig {
    /// The three listeners must not share a port. Port 0 delegates selection to
    /// the OS and can never collide, so it is exempt.
    pub fn validate(&self) -> BootstrapResult<()> {
        let listeners = [
            ("rtmp", self.rtmp.port),
            ("media http", self.media_http.port),
            ("status api", self.status_api.port),
        ];
        for (i, (name_a, port_a)) in listeners.iter().enumerate() {
            for (name_b, port_b) in listeners.iter().skip(i + 1) {
                if *port_a != 0 && port_a == port_b {
                    return Err(BootstrapError::Configuration(format!(
                        "{} and {} listeners share port {}",
                        name_a, name_b, port_a
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ports_are_distinct() {
        IngestConfig::default().validate().unwrap();
    }

    #[test]
    fn shared_port_is_rejected() {
        let mut config = IngestConfig::default();
        config.rtmp.port = 3000;
        config.status_api.port = 3000;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, BootstrapError::Configuration(_)));
    }

    #[test]
    fn port_zero_never_collides() {
        let mut config = IngestConfig::default();
        config.rtmp.port = 0;
        config.media_http.port = 0;
        config.status_api.port = 0;
        config.validate().unwrap();
    }
}
