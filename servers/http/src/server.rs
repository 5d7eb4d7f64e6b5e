use std::{
    convert::Infallible,
    io,
    net::SocketAddr,
    path::{Component, Path, PathBuf},
    pin::Pin,
    sync::Arc,
};

use http_body_util::Full;
use hyper::{
    Method, Request, Response, StatusCode,
    body::{Bytes, Incoming},
    header,
    server::conn::http1,
    service::Service,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::{config::MediaHttpConfig, errors::MediaHttpResult};

/// Serves files the media engine writes under `media_root`. GET only, CORS origin
/// from config, no directory listings.
#[derive(Debug)]
pub struct MediaHttpServer {
    config: Arc<MediaHttpConfig>,
    listener: TcpListener,
}

impl MediaHttpServer {
    pub async fn bind(config: &MediaHttpConfig) -> io::Result<Self> {
        let listener = TcpListener::bind((config.address.as_str(), config.port)).await?;
        Ok(Self {
            config: Arc::new(config.clone()),
            listener,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self, cancellation: CancellationToken) -> MediaHttpResult<()> {
        tracing::info!(
            "media http server listening on {:?}, media root: {:?}",
            self.listener.local_addr(),
            self.config.media_root
        );
        loop {
            tokio::select! {
                _ = cancellation.cancelled() => {
                    tracing::info!("media http server is shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (tcp_stream, addr) = accepted?;
                    tracing::debug!("new media http connection from {}", addr);
                    let service = MediaService {
                        config: Arc::clone(&self.config),
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

#[derive(Debug, Clone)]
struct MediaService {
    config: Arc<MediaHttpConfig>,
}

impl Service<Request<Incoming>> for MediaService {
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let config = Arc::clone(&self.config);
        Box::pin(async move { Ok(serve_media(&config, &req).await) })
    }
}

async fn serve_media(config: &MediaHttpConfig, req: &Request<Incoming>) -> Response<Full<Bytes>> {
    if req.method() != Method::GET {
        return respond(
            config,
            StatusCode::METHOD_NOT_ALLOWED,
            "text/plain",
            Bytes::from_static(b"method not allowed"),
        );
    }

    let Some(file_path) = resolve_media_path(&config.media_root, req.uri().path()) else {
        return respond(
            config,
            StatusCode::BAD_REQUEST,
            "text/plain",
            Bytes::from_static(b"bad request"),
        );
    };

    match tokio::fs::read(&file_path).await {
        Ok(contents) => respond(
            config,
            StatusCode::OK,
            content_type_for(&file_path),
            Bytes::from(contents),
        ),
        Err(err) => {
            tracing::debug!("media file {:?} not served: {}", file_path, err);
            respond(
                config,
                StatusCode::NOT_FOUND,
                "text/plain",
                Bytes::from_static(b"not found"),
            )
        }
    }
}

fn respond(
    config: &MediaHttpConfig,
    status: StatusCode,
    content_type: &'static str,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, header::HeaderValue::from_static(content_type));
    match header::HeaderValue::from_str(config.allowed_origin.as_str()) {
        Ok(origin) => {
            response
                .headers_mut()
                .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        Err(err) => {
            tracing::warn!("configured allowed_origin is not a valid header value: {}", err);
        }
    }
    response
}

/// Maps a request path to a file under the media root. Rejects empty paths and any
/// path that could escape the root (`..`, absolute components, drive prefixes).
fn resolve_media_path(media_root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut resolved = media_root.to_path_buf();
    let mut segments = 0usize;
    for component in Path::new(request_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(segment) => {
                resolved.push(segment);
                segments += 1;
            }
            Component::CurDir => {}
            _ => return None,
        }
    }
    if segments == 0 { None } else { Some(resolved) }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("flv") => "video/x-flv",
        Some("m3u8") => "application/vnd.apple.mpegurl",
        Some("ts") => "video/mp2t",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_nested_paths_under_root() {
        let resolved = resolve_media_path(Path::new("/srv/media"), "/live/abc123.flv").unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/media/live/abc123.flv"));
    }

    #[test]
    fn rejects_traversal_attempts() {
        let root = Path::new("/srv/media");
        assert!(resolve_media_path(root, "/../etc/passwd").is_none());
        assert!(resolve_media_path(root, "/live/../../etc/passwd").is_none());
        assert!(resolve_media_path(root, "/").is_none());
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type_for(Path::new("a.flv")), "video/x-flv");
        assert_eq!(
            content_type_for(Path::new("a.m3u8")),
            "application/vnd.apple.mpegurl"
        );
        assert_eq!(content_type_for(Path::new("a.bin")), "application/octet-stream");
    }

    #[tokio::test]
    async fn serves_files_with_cors_header() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let media_root = tempfile::tempdir().unwrap();
        tokio::fs::write(media_root.path().join("clip.mp4"), b"mp4-bytes")
            .await
            .unwrap();

        let config = MediaHttpConfig {
            address: "127.0.0.1".to_owned(),
            port: 0,
            allowed_origin: "https://bluetube.tv".to_owned(),
            media_root: media_root.path().to_path_buf(),
        };
        let server = MediaHttpServer::bind(&config).await.unwrap();
        let addr = server.local_addr().unwrap();
        let cancellation = CancellationToken::new();
        let token = cancellation.clone();
        tokio::spawn(async move {
            let _ = server.run(token).await;
        });

        let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /clip.mp4 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("access-control-allow-origin: https://bluetube.tv"));
        assert!(response.contains("content-type: video/mp4"));
        assert!(response.ends_with("mp4-bytes"));

        cancellation.cancel();
    }
}
