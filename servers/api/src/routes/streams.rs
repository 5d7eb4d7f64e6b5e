use http_body_util::Full;
use hyper::{Response, StatusCode, body::Bytes};

use super::json_response;
use crate::server::ApiState;

/// Lookup failures degrade to a best-effort payload instead of a 5xx so viewer
/// pages keep rendering.
pub fn stream_status(state: &ApiState, stream_key: &str) -> Response<Full<Bytes>> {
    match state.provider.stream_status(stream_key) {
        Ok(status) => json_response(StatusCode::OK, &status),
        Err(err) => {
            tracing::warn!("stream status lookup for {} degraded: {}", stream_key, err);
            json_response(
                StatusCode::OK,
                &serde_json::json!({
                    "isLive": false,
                    "error": err.to_string(),
                }),
            )
        }
    }
}
