use http_body_util::Full;
use hyper::{Response, StatusCode, body::Bytes};
use store::chat::ChatMessage;

use super::{json_response, plain};
use crate::server::ApiState;

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostMessageBody {
    user: String,
    message: String,
    #[serde(default)]
    is_tip: bool,
    #[serde(default)]
    amount: f64,
}

pub fn history(state: &ApiState, stream_id: &str) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &serde_json::json!({ "messages": state.chat.recent(stream_id) }),
    )
}

pub fn post(state: &ApiState, stream_id: &str, body: Option<Bytes>) -> Response<Full<Bytes>> {
    let Some(body) = body else {
        return plain(StatusCode::BAD_REQUEST, "missing body");
    };
    let parsed: PostMessageBody = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::debug!("rejecting chat message for {}: {}", stream_id, err);
            return plain(StatusCode::BAD_REQUEST, "invalid chat message");
        }
    };

    let message = ChatMessage::new(parsed.user, parsed.message, parsed.is_tip, parsed.amount);
    state.chat.append(stream_id, message.clone());
    json_response(StatusCode::CREATED, &message)
}
