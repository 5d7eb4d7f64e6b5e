#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StatusApiConfig {
    pub address: String,
    pub port: u16,
    /// Host advertised in playback/ingest URLs returned by the stream-status route.
    pub public_host: String,
}

impl Default for StatusApiConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_owned(),
            port: 3000,
            public_host: "your-domain".to_owned(),
        }
    }
}
