use std::path::PathBuf;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MediaHttpConfig {
    pub address: String,
    pub port: u16,
    /// Value sent back as `Access-Control-Allow-Origin` on every response.
    pub allowed_origin: String,
    /// Directory the media engine records/caches into; served read-only here.
    pub media_root: PathBuf,
}

impl Default for MediaHttpConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_owned(),
            port: 8000,
            allowed_origin: "*".to_owned(),
            media_root: PathBuf::from("./media"),
        }
    }
}
