use crate::consts::{
    DEFAULT_CHUNK_SIZE, DEFAULT_PING_INTERVAL_SECS, DEFAULT_PING_TIMEOUT_SECS, DEFAULT_RTMP_PORT,
};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RtmpIngestConfig {
    pub address: String,
    pub port: u16,
    pub chunk_size: u32,
    /// Engine hint only; this build keeps no GOP cache (playback is not served here).
    pub gop_cache: bool,
    pub ping_interval_secs: u64,
    pub ping_timeout_secs: u64,
}

impl Default for RtmpIngestConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_owned(),
            port: DEFAULT_RTMP_PORT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            gop_cache: true,
            ping_interval_secs: DEFAULT_PING_INTERVAL_SECS,
            ping_timeout_secs: DEFAULT_PING_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RtmpSessionConfig {
    pub chunk_size: u32,
    /// A connection silent for longer than this is considered gone and dropped.
    pub idle_timeout_secs: u64,
}

impl From<&RtmpIngestConfig> for RtmpSessionConfig {
    fn from(config: &RtmpIngestConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            // Matches the engine keepalive contract: a client gets one full ping
            // interval plus the timeout before the server gives up on it.
            idle_timeout_secs: config.ping_interval_secs + config.ping_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_idle_timeout_combines_ping_interval_and_timeout() {
        let config = RtmpIngestConfig {
            ping_interval_secs: 30,
            ping_timeout_secs: 60,
            ..Default::default()
        };
        let session: RtmpSessionConfig = (&config).into();
        assert_eq!(session.idle_timeout_secs, 90);
        assert_eq!(session.chunk_size, DEFAULT_CHUNK_SIZE);
    }
}
