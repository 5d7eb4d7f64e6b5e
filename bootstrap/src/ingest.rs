use std::{net::SocketAddr, sync::Arc};

use media_http::server::MediaHttpServer;
use rtmp_ingest::server::RtmpIngestServer;
use status_api::{
    provider::RegistryStatusProvider,
    server::{ApiState, StatusApiServer},
};
use store::{
    chat::{ChatStore, MemoryChatStore},
    claims::{ClaimStore, MemoryClaimStore},
};
use stream_hub::{
    events::{LifecycleEvent, PublishEvent},
    hub::LifecycleHub,
    observer::{LifecycleObserver, LogObserver},
    registry::LiveRegistry,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    config::IngestConfig,
    errors::{BootstrapError, BootstrapResult},
};

/// Wires the RTMP listener, the media HTTP endpoint and the status API into one
/// process. Observers and stores are registered up front; `initialize` binds all
/// listeners eagerly and spawns the run loops.
pub struct Ingest {
    config: IngestConfig,
    hub: LifecycleHub,
    chat: Arc<dyn ChatStore>,
    claims: Arc<dyn ClaimStore>,
}

impl Ingest {
    pub fn new(config: IngestConfig) -> Self {
        let mut hub = LifecycleHub::new();
        hub.register(Box::new(LogObserver));
        Self {
            config,
            hub,
            chat: Arc::new(MemoryChatStore::new()),
            claims: Arc::new(MemoryClaimStore::new()),
        }
    }

    pub fn register_observer(mut self, observer: Box<dyn LifecycleObserver>) -> Self {
        self.hub.register(observer);
        self
    }

    pub fn on_publish_start<F>(self, handler: F) -> Self
    where
        F: Fn(&PublishEvent) + Send + Sync + 'static,
    {
        self.register_observer(Box::new(StartHandler(handler)))
    }

    pub fn on_publish_confirmed<F>(self, handler: F) -> Self
    where
        F: Fn(&PublishEvent) + Send + Sync + 'static,
    {
        self.register_observer(Box::new(ConfirmedHandler(handler)))
    }

    pub fn on_publish_end<F>(self, handler: F) -> Self
    where
        F: Fn(&PublishEvent) + Send + Sync + 'static,
    {
        self.register_observer(Box::new(EndHandler(handler)))
    }

    pub fn with_chat_store(mut self, store: Arc<dyn ChatStore>) -> Self {
        self.chat = store;
        self
    }

    pub fn with_claim_store(mut self, store: Arc<dyn ClaimStore>) -> Self {
        self.claims = store;
        self
    }

    pub async fn initialize(self) -> BootstrapResult<RunningIngest> {
        self.config.validate()?;

        let event_sender = self.hub.get_event_sender();
        let registry = self.hub.registry();

        let rtmp = RtmpIngestServer::bind(&self.config.rtmp, event_sender.clone())
            .await
            .map_err(|source| BootstrapError::ListenerBind {
                listener: "rtmp",
                source,
            })?;
        let rtmp_addr = rtmp.local_addr().map_err(|source| {
            BootstrapError::ListenerBind {
                listener: "rtmp",
                source,
            }
        })?;

        let media = MediaHttpServer::bind(&self.config.media_http)
            .await
            .map_err(|source| BootstrapError::ListenerBind {
                listener: "media http",
                source,
            })?;
        let media_addr = media.local_addr().map_err(|source| {
            BootstrapError::ListenerBind {
                listener: "media http",
                source,
            }
        })?;

        let provider = RegistryStatusProvider::new(
            registry.clone(),
            self.config.status_api.public_host.clone(),
            media_addr.port(),
        );
        let state = ApiState::new(Arc::new(provider), self.chat, self.claims);
        let api = StatusApiServer::bind(&self.config.status_api, state)
            .await
            .map_err(|source| BootstrapError::ListenerBind {
                listener: "status api",
                source,
            })?;
        let api_addr = api.local_addr().map_err(|source| {
            BootstrapError::ListenerBind {
                listener: "status api",
                source,
            }
        })?;

        let cancellation = CancellationToken::new();
        let mut hub = self.hub;

        let token = cancellation.clone();
        tokio::spawn(async move {
            if let Err(err) = hub.run(token).await {
                tracing::error!("lifecycle hub exited with err: {:?}", err);
            }
        });

        let token = cancellation.clone();
        tokio::spawn(async move {
            if let Err(err) = rtmp.run(token).await {
                tracing::error!("rtmp ingest exited with err: {:?}", err);
            }
        });

        let token = cancellation.clone();
        tokio::spawn(async move {
            if let Err(err) = media.run(token).await {
                tracing::error!("media http server exited with err: {:?}", err);
            }
        });

        let token = cancellation.clone();
        tokio::spawn(async move {
            if let Err(err) = api.run(token).await {
                tracing::error!("status api exited with err: {:?}", err);
            }
        });

        tracing::info!(
            "ingest is up, rtmp: {}, media http: {}, status api: {}",
            rtmp_addr,
            media_addr,
            api_addr
        );

        Ok(RunningIngest {
            cancellation,
            event_sender,
            registry,
            rtmp_addr,
            media_addr,
            api_addr,
        })
    }
}

pub async fn initialize(config: IngestConfig) -> BootstrapResult<RunningIngest> {
    Ingest::new(config).initialize().await
}

/// Handle to a started ingest process. Dropping it does not stop anything;
/// call [`RunningIngest::shutdown`].
#[derive(Debug)]
pub struct RunningIngest {
    cancellation: CancellationToken,
    event_sender: mpsc::UnboundedSender<LifecycleEvent>,
    registry: LiveRegistry,
    rtmp_addr: SocketAddr,
    media_addr: SocketAddr,
    api_addr: SocketAddr,
}

impl RunningIngest {
    /// Stops all listeners and the dispatch loop. Idempotent.
    pub fn shutdown(&self) {
        self.cancellation.cancel();
    }

    pub fn rtmp_addr(&self) -> SocketAddr {
        self.rtmp_addr
    }

    pub fn media_addr(&self) -> SocketAddr {
        self.media_addr
    }

    pub fn api_addr(&self) -> SocketAddr {
        self.api_addr
    }

    pub fn registry(&self) -> LiveRegistry {
        self.registry.clone()
    }

    /// Direct feed into the lifecycle hub; used by tests to simulate sessions.
    pub fn event_sender(&self) -> mpsc::UnboundedSender<LifecycleEvent> {
        self.event_sender.clone()
    }
}

struct StartHandler<F>(F);

impl<F> LifecycleObserver for StartHandler<F>
where
    F: Fn(&PublishEvent) + Send + Sync,
{
    fn on_publish_start(&self, event: &PublishEvent) {
        (self.0)(event);
    }
}

struct ConfirmedHandler<F>(F);

impl<F> LifecycleObserver for ConfirmedHandler<F>
where
    F: Fn(&PublishEvent) + Send + Sync,
{
    fn on_publish_confirmed(&self, event: &PublishEvent) {
        (self.0)(event);
    }
}

struct EndHandler<F>(F);

impl<F> LifecycleObserver for EndHandler<F>
where
    F: Fn(&PublishEvent) + Send + Sync,
{
    fn on_publish_end(&self, event: &PublishEvent) {
        (self.0)(event);
    }
}
