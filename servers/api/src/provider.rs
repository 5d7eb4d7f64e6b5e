use stream_hub::registry::LiveRegistry;
use thiserror::Error;

/// Collaborator-layer failures. These degrade the status response, they never
/// become a 5xx for the viewer-facing pages.
#[derive(Debug, Error)]
pub enum StatusProviderError {
    #[error("status backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStatus {
    pub is_live: bool,
    pub playback_url: Option<String>,
    pub rtmp_url: String,
}

/// Seam for stream-status lookups. The shipped implementation reads the local live
/// registry; a remote one (e.g. a hosted stream API) plugs in here without touching
/// the routes.
pub trait StreamStatusProvider: Send + Sync {
    fn stream_status(&self, stream_key: &str) -> Result<StreamStatus, StatusProviderError>;
}

/// Answers from the hub's live registry. Stream keys map onto the ingest path
/// `/live/<key>`, so this stays consistent with the RTMP publish URL naming.
#[derive(Debug, Clone)]
pub struct RegistryStatusProvider {
    registry: LiveRegistry,
    public_host: String,
    media_port: u16,
}

impl RegistryStatusProvider {
    pub fn new(registry: LiveRegistry, public_host: String, media_port: u16) -> Self {
        Self {
            registry,
            public_host,
            media_port,
        }
    }
}

impl StreamStatusProvider for RegistryStatusProvider {
    fn stream_status(&self, stream_key: &str) -> Result<StreamStatus, StatusProviderError> {
        let stream_path = format!("/live/{}", stream_key);
        let is_live = self.registry.is_live(&stream_path);
        Ok(StreamStatus {
            is_live,
            playback_url: is_live.then(|| {
                format!(
                    "http://{}:{}/live/{}.flv",
                    self.public_host, self.media_port, stream_key
                )
            }),
            rtmp_url: format!("rtmp://{}:1935/live", self.public_host),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_is_not_live() {
        let provider =
            RegistryStatusProvider::new(LiveRegistry::new(), "your-domain".to_owned(), 8000);
        let status = provider.stream_status("abc123").unwrap();
        assert!(!status.is_live);
        assert!(status.playback_url.is_none());
        assert_eq!(status.rtmp_url, "rtmp://your-domain:1935/live");
    }
}
