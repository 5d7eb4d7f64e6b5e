use std::{io, net::SocketAddr};

use stream_hub::events::LifecycleEvent;
use tokio::{net::TcpListener, sync::mpsc};
use tokio_util::sync::CancellationToken;

use crate::{
    config::{RtmpIngestConfig, RtmpSessionConfig},
    errors::RtmpIngestResult,
    session::IngestSession,
};

/// RTMP ingest listener. Accepts publisher connections and runs one engine session
/// per connection; lifecycle transitions are forwarded to the hub, nothing is gated
/// here (publish authorization is intentionally absent, see DESIGN.md).
#[derive(Debug)]
pub struct RtmpIngestServer {
    config: RtmpIngestConfig,
    listener: TcpListener,
    event_sender: mpsc::UnboundedSender<LifecycleEvent>,
}

impl RtmpIngestServer {
    /// Binds the ingest port eagerly so the caller sees bind failures before any
    /// session work starts.
    pub async fn bind(
        config: &RtmpIngestConfig,
        event_sender: mpsc::UnboundedSender<LifecycleEvent>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind((config.address.as_str(), config.port)).await?;
        Ok(Self {
            config: config.clone(),
            listener,
            event_sender,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self, cancellation: CancellationToken) -> RtmpIngestResult<()> {
        tracing::info!(
            "rtmp ingest listening on {:?}, chunk_size: {}, gop_cache: {}",
            self.listener.local_addr(),
            self.config.chunk_size,
            self.config.gop_cache
        );
        let session_config: RtmpSessionConfig = (&self.config).into();
        loop {
            tokio::select! {
                _ = cancellation.cancelled() => {
                    tracing::info!("rtmp ingest is shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (tcp_stream, addr) = accepted?;
                    tracing::info!("new rtmp connection from {}", addr);
                    let session = IngestSession::new(
                        tcp_stream,
                        session_config.clone(),
                        self.event_sender.clone(),
                    );
                    let session_cancellation = cancellation.clone();
                    tokio::spawn(async move {
                        match session.run(session_cancellation).await {
                            Ok(()) => {
                                tracing::info!("rtmp session closed");
                            }
                            Err(err) => {
                                tracing::error!("rtmp session failed: {:?}", err);
                            }
                        }
                    });
                }
            }
        }
    }
}
