use http_body_util::Full;
use hyper::{Response, StatusCode, body::Bytes};

use super::json_response;

/// Fixed health payload; monitoring and the frontend both match on it verbatim.
#[derive(Debug, serde::Serialize)]
pub struct StatusResponse {
    status: &'static str,
    rtmp: &'static str,
    note: &'static str,
}

pub fn root() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &StatusResponse {
            status: "BlueTubeTV Streaming Backend Running",
            rtmp: "rtmp://your-domain:1935/live",
            note: "Append your stream key to the RTMP URL",
        },
    )
}
