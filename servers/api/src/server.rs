use std::{convert::Infallible, io, net::SocketAddr, pin::Pin, sync::Arc};

use http_body_util::Full;
use hyper::{
    Request, Response,
    body::{Bytes, Incoming},
    server::conn::http1,
    service::Service,
};
use hyper_util::rt::TokioIo;
use store::{chat::ChatStore, claims::ClaimStore};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::{
    config::StatusApiConfig, errors::StatusApiResult, provider::StreamStatusProvider, routes,
};

/// Injected collaborators for the API routes. Everything is behind a trait object
/// so process-local defaults and durable/remote backends are interchangeable.
#[derive(Clone)]
pub struct ApiState {
    pub provider: Arc<dyn StreamStatusProvider>,
    pub chat: Arc<dyn ChatStore>,
    pub claims: Arc<dyn ClaimStore>,
}

impl ApiState {
    pub fn new(
        provider: Arc<dyn StreamStatusProvider>,
        chat: Arc<dyn ChatStore>,
        claims: Arc<dyn ClaimStore>,
    ) -> Self {
        Self {
            provider,
            chat,
            claims,
        }
    }
}

pub struct StatusApiServer {
    config: StatusApiConfig,
    listener: TcpListener,
    state: ApiState,
}

impl StatusApiServer {
    pub async fn bind(config: &StatusApiConfig, state: ApiState) -> io::Result<Self> {
        let listener = TcpListener::bind((config.address.as_str(), config.port)).await?;
        Ok(Self {
            config: config.clone(),
            listener,
            state,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self, cancellation: CancellationToken) -> StatusApiResult<()> {
        tracing::info!(
            "status api listening on {:?}, public host: {}",
            self.listener.local_addr(),
            self.config.public_host
        );
        loop {
            tokio::select! {
                _ = cancellation.cancelled() => {
                    tracing::info!("status api is shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (tcp_stream, addr) = accepted?;
                    tracing::debug!("new status api connection from {}", addr);
                    let service = ApiService {
                        state: self.state.clone(),
                    };
                    tokio::spawn(async move {
                        let _ = http1::Builder::new()
                            .serve_connection(TokioIo::new(tcp_stream), service)
                            .await;
                    });
                }
            }
        }
    }
}

#[derive(Clone)]
struct ApiService {
    state: ApiState,
}

impl Service<Request<Incoming>> for ApiService {
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let state = self.state.clone();
        Box::pin(async move { Ok(routes::dispatch(state, req).await) })
    }
}

#[cfg(test)]
mod tests {
    use store::{chat::MemoryChatStore, claims::MemoryClaimStore};
    use stream_hub::registry::LiveRegistry;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use super::*;
    use crate::provider::{RegistryStatusProvider, StatusProviderError, StreamStatus};

    fn local_state() -> ApiState {
        ApiState::new(
            Arc::new(RegistryStatusProvider::new(
                LiveRegistry::new(),
                "your-domain".to_owned(),
                8000,
            )),
            Arc::new(MemoryChatStore::new()),
            Arc::new(MemoryClaimStore::new()),
        )
    }

    async fn start_server(state: ApiState) -> (SocketAddr, CancellationToken) {
        let config = StatusApiConfig {
            address: "127.0.0.1".to_owned(),
            port: 0,
            ..Default::default()
        };
        let server = StatusApiServer::bind(&config, state).await.unwrap();
        let addr = server.local_addr().unwrap();
        let cancellation = CancellationToken::new();
        let token = cancellation.clone();
        tokio::spawn(async move {
            let _ = server.run(token).await;
        });
        (addr, cancellation)
    }

    async fn request(addr: SocketAddr, raw: &str) -> String {
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(raw.as_bytes()).await.unwrap();
        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn root_returns_the_exact_status_payload() {
        let (addr, cancellation) = start_server(local_state()).await;

        let response = request(
            addr,
            "GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        let body = response.split("\r\n\r\n").nth(1).unwrap();
        assert_eq!(
            body,
            "{\"status\":\"BlueTubeTV Streaming Backend Running\",\
             \"rtmp\":\"rtmp://your-domain:1935/live\",\
             \"note\":\"Append your stream key to the RTMP URL\"}"
        );

        cancellation.cancel();
    }

    #[tokio::test]
    async fn chat_roundtrip_over_http() {
        let (addr, cancellation) = start_server(local_state()).await;

        let body = "{\"user\":\"pilot\",\"message\":\"hello\",\"isTip\":true,\"amount\":5.0}";
        let post = format!(
            "POST /api/chat/abc123 HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let response = request(addr, &post).await;
        assert!(response.starts_with("HTTP/1.1 201 Created"));

        let response = request(
            addr,
            "GET /api/chat/abc123 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("\"isTip\":true"));
        assert!(response.contains("\"message\":\"hello\""));

        cancellation.cancel();
    }

    #[tokio::test]
    async fn duplicate_claim_conflicts() {
        let (addr, cancellation) = start_server(local_state()).await;

        let body = "{\"jobId\":\"job-1\",\"pilot\":\"ace\"}";
        let post = format!(
            "POST /api/claims HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let first = request(addr, &post).await;
        assert!(first.starts_with("HTTP/1.1 201 Created"));

        let second = request(addr, &post).await;
        assert!(second.starts_with("HTTP/1.1 409 Conflict"));

        cancellation.cancel();
    }

    struct FlakyProvider;

    impl StreamStatusProvider for FlakyProvider {
        fn stream_status(&self, _stream_key: &str) -> Result<StreamStatus, StatusProviderError> {
            Err(StatusProviderError::Unavailable("upstream timeout".to_owned()))
        }
    }

    #[tokio::test]
    async fn provider_failure_degrades_instead_of_500() {
        let state = ApiState::new(
            Arc::new(FlakyProvider),
            Arc::new(MemoryChatStore::new()),
            Arc::new(MemoryClaimStore::new()),
        );
        let (addr, cancellation) = start_server(state).await;

        let response = request(
            addr,
            "GET /api/stream-status/abc123 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("\"isLive\":false"));
        assert!(response.contains("upstream timeout"));

        cancellation.cancel();
    }

    #[tokio::test]
    async fn unknown_stream_key_reports_offline() {
        let (addr, cancellation) = start_server(local_state()).await;

        let response = request(
            addr,
            "GET /api/stream-status/nobody HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("\"isLive\":false"));
        assert!(response.contains("rtmp://your-domain:1935/live"));

        cancellation.cancel();
    }
}
