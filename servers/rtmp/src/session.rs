use std::collections::VecDeque;

use rml_rtmp::{
    handshake::{Handshake, HandshakeProcessResult, PeerType},
    sessions::{ServerSession, ServerSessionConfig, ServerSessionEvent, ServerSessionResult},
};
use stream_hub::events::{LifecycleEvent, PublishEvent};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::mpsc,
    time::{Duration, timeout},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    config::RtmpSessionConfig,
    consts::READ_BUFFER_SIZE,
    errors::{RtmpIngestError, RtmpIngestResult},
};

/// One publisher connection: handshake, then an engine event pump.
///
/// The engine (`rml_rtmp`) owns all protocol state; this session only writes the
/// packets it asks for and turns its publish events into hub notifications.
/// `donePublish` is emitted exactly once per accepted publish, whether the client
/// stops cleanly, disconnects, or goes silent past the keepalive window.
pub struct IngestSession {
    id: String,
    stream: TcpStream,
    config: RtmpSessionConfig,
    event_sender: mpsc::UnboundedSender<LifecycleEvent>,
    publishing: Option<PublishEvent>,
}

impl IngestSession {
    pub fn new(
        stream: TcpStream,
        config: RtmpSessionConfig,
        event_sender: mpsc::UnboundedSender<LifecycleEvent>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            stream,
            config,
            event_sender,
            publishing: None,
        }
    }

    pub async fn run(mut self, cancellation: CancellationToken) -> RtmpIngestResult<()> {
        let result = self.serve(cancellation).await;
        // Disconnect and error paths both end the publish.
        self.emit_publish_end();
        result
    }

    async fn serve(&mut self, cancellation: CancellationToken) -> RtmpIngestResult<()> {
        let remaining = match self.handshake().await? {
            Some(bytes) => bytes,
            None => return Ok(()),
        };
        self.pump(remaining, cancellation).await
    }

    async fn handshake(&mut self) -> RtmpIngestResult<Option<Vec<u8>>> {
        let mut handshake = Handshake::new(PeerType::Server);
        let p0_and_p1 = handshake
            .generate_outbound_p0_and_p1()
            .map_err(|err| RtmpIngestError::HandshakeFailed(format!("{:?}", err)))?;
        self.stream.write_all(&p0_and_p1).await?;

        let mut buffer = [0u8; READ_BUFFER_SIZE];
        loop {
            let bytes_read = self.read_some(&mut buffer).await?;
            if bytes_read == 0 {
                return Ok(None);
            }
            let result = handshake
                .process_bytes(&buffer[..bytes_read])
                .map_err(|err| RtmpIngestError::HandshakeFailed(format!("{:?}", err)))?;
            match result {
                HandshakeProcessResult::InProgress { response_bytes } => {
                    self.stream.write_all(&response_bytes).await?;
                }
                HandshakeProcessResult::Completed {
                    response_bytes,
                    remaining_bytes,
                } => {
                    self.stream.write_all(&response_bytes).await?;
                    return Ok(Some(remaining_bytes));
                }
            }
        }
    }

    async fn pump(
        &mut self,
        received: Vec<u8>,
        cancellation: CancellationToken,
    ) -> RtmpIngestResult<()> {
        let session_config = ServerSessionConfig {
            chunk_size: self.config.chunk_size,
            ..ServerSessionConfig::new()
        };
        let (mut session, initial_results) = ServerSession::new(session_config)
            .map_err(|err| RtmpIngestError::SessionError(format!("{:?}", err)))?;
        self.handle_results(&mut session, initial_results).await?;

        let results = session
            .handle_input(&received)
            .map_err(|err| RtmpIngestError::SessionError(format!("{:?}", err)))?;
        self.handle_results(&mut session, results).await?;

        let mut buffer = [0u8; READ_BUFFER_SIZE];
        loop {
            let bytes_read = tokio::select! {
                _ = cancellation.cancelled() => return Ok(()),
                read = self.read_some(&mut buffer) => read?,
            };
            if bytes_read == 0 {
                return Ok(());
            }
            let results = session
                .handle_input(&buffer[..bytes_read])
                .map_err(|err| RtmpIngestError::SessionError(format!("{:?}", err)))?;
            self.handle_results(&mut session, results).await?;
        }
    }

    /// Reads under the keepalive deadline; a timeout reads as a disconnect.
    async fn read_some(&mut self, buffer: &mut [u8]) -> RtmpIngestResult<usize> {
        let deadline = Duration::from_secs(self.config.idle_timeout_secs);
        match timeout(deadline, self.stream.read(buffer)).await {
            Err(_elapsed) => {
                tracing::info!(
                    "rtmp session {} idle beyond keepalive window, dropping",
                    self.id
                );
                Ok(0)
            }
            Ok(result) => Ok(result?),
        }
    }

    async fn handle_results(
        &mut self,
        session: &mut ServerSession,
        results: Vec<ServerSessionResult>,
    ) -> RtmpIngestResult<()> {
        let mut queue: VecDeque<ServerSessionResult> = results.into();
        while let Some(result) = queue.pop_front() {
            match result {
                ServerSessionResult::OutboundResponse(packet) => {
                    self.stream.write_all(&packet.bytes).await?;
                }
                ServerSessionResult::RaisedEvent(event) => {
                    queue.extend(self.handle_event(session, event)?);
                }
                ServerSessionResult::UnhandleableMessageReceived(_) => {
                    tracing::debug!("unhandleable rtmp message from session {}", self.id);
                }
            }
        }
        Ok(())
    }

    fn handle_event(
        &mut self,
        session: &mut ServerSession,
        event: ServerSessionEvent,
    ) -> RtmpIngestResult<Vec<ServerSessionResult>> {
        match event {
            ServerSessionEvent::ConnectionRequested {
                request_id,
                app_name,
            } => {
                tracing::info!("session {} requested connection to app {}", self.id, app_name);
                session
                    .accept_request(request_id)
                    .map_err(|err| {
                        RtmpIngestError::SessionError(format!("accept connection: {:?}", err))
                    })
            }
            ServerSessionEvent::PublishStreamRequested {
                request_id,
                app_name,
                stream_key,
                mode,
            } => {
                let publish = PublishEvent::new(
                    self.id.clone(),
                    format!("/{}/{}", app_name, stream_key),
                );
                tracing::info!(
                    "session {} requested publish on {} in mode {:?}",
                    self.id,
                    publish.stream_path,
                    mode
                );
                self.emit(LifecycleEvent::PublishStart(publish.clone()));
                // Recorded before accept so a failed accept still ends the publish.
                self.publishing = Some(publish.clone());
                let results = session.accept_request(request_id).map_err(|err| {
                    RtmpIngestError::SessionError(format!("accept publish: {:?}", err))
                })?;
                self.emit(LifecycleEvent::PublishConfirmed(publish));
                Ok(results)
            }
            ServerSessionEvent::PublishStreamFinished {
                app_name,
                stream_key,
            } => {
                tracing::info!(
                    "session {} finished publishing on /{}/{}",
                    self.id,
                    app_name,
                    stream_key
                );
                self.emit_publish_end();
                Ok(Vec::new())
            }
            ServerSessionEvent::StreamMetadataChanged { stream_key, .. } => {
                tracing::debug!("metadata changed for stream key {}", stream_key);
                Ok(Vec::new())
            }
            ServerSessionEvent::AudioDataReceived { .. }
            | ServerSessionEvent::VideoDataReceived { .. } => Ok(Vec::new()),
            other => {
                tracing::debug!("ignoring rtmp event: {:?}", other);
                Ok(Vec::new())
            }
        }
    }

    fn emit(&self, event: LifecycleEvent) {
        if self.event_sender.send(event).is_err() {
            tracing::warn!(
                "lifecycle hub is gone, dropping event from session {}",
                self.id
            );
        }
    }

    fn emit_publish_end(&mut self) {
        if let Some(publish) = self.publishing.take() {
            self.emit(LifecycleEvent::PublishEnd(publish));
        }
    }
}
