pub mod chat;
pub mod claims;
pub mod status;
pub mod streams;

use http_body_util::{BodyExt, Full};
use hyper::{
    Method, Request, Response, StatusCode,
    body::{Bytes, Incoming},
    header,
};

use crate::server::ApiState;

pub async fn dispatch(state: ApiState, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (&method, segments.as_slice()) {
        (&Method::GET, []) => status::root(),
        (&Method::GET, ["api", "stream-status", stream_key]) => {
            streams::stream_status(&state, stream_key)
        }
        (&Method::GET, ["api", "chat", stream_id]) => chat::history(&state, stream_id),
        (&Method::POST, ["api", "chat", stream_id]) => {
            let stream_id = (*stream_id).to_owned();
            let body = read_body(req).await;
            chat::post(&state, &stream_id, body)
        }
        (&Method::GET, ["api", "claims"]) => claims::list(&state),
        (&Method::POST, ["api", "claims"]) => {
            let body = read_body(req).await;
            claims::post(&state, body)
        }
        _ => plain(StatusCode::NOT_FOUND, "not found"),
    }
}

async fn read_body(req: Request<Incoming>) -> Option<Bytes> {
    req.into_body()
        .collect()
        .await
        .ok()
        .map(|collected| collected.to_bytes())
}

pub(crate) fn json_response<T: serde::Serialize>(
    status: StatusCode,
    payload: &T,
) -> Response<Full<Bytes>> {
    match serde_json::to_vec(payload) {
        Ok(body) => respond(status, "application/json", Bytes::from(body)),
        Err(err) => {
            tracing::error!("serializing api response failed: {}", err);
            plain(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

pub(crate) fn plain(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    respond(status, "text/plain", Bytes::from_static(message.as_bytes()))
}

fn respond(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(content_type),
    );
    response
}
