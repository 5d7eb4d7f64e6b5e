use http_body_util::Full;
use hyper::{Response, StatusCode, body::Bytes};
use store::errors::StoreError;

use super::{json_response, plain};
use crate::server::ApiState;

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostClaimBody {
    job_id: String,
    pilot: String,
}

pub fn list(state: &ApiState) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &serde_json::json!({ "claims": state.claims.claims() }),
    )
}

pub fn post(state: &ApiState, body: Option<Bytes>) -> Response<Full<Bytes>> {
    let Some(body) = body else {
        return plain(StatusCode::BAD_REQUEST, "missing body");
    };
    let parsed: PostClaimBody = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::debug!("rejecting job claim: {}", err);
            return plain(StatusCode::BAD_REQUEST, "invalid claim");
        }
    };

    match state.claims.claim(&parsed.job_id, &parsed.pilot) {
        Ok(claim) => json_response(StatusCode::CREATED, &claim),
        Err(err @ StoreError::AlreadyClaimed(_)) => json_response(
            StatusCode::CONFLICT,
            &serde_json::json!({ "error": err.to_string() }),
        ),
    }
}
