use std::{
    collections::HashMap,
    panic::{AssertUnwindSafe, catch_unwind},
};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    errors::{StreamHubError, StreamHubResult},
    events::{LifecycleEvent, PublishPhase},
    observer::LifecycleObserver,
    registry::LiveRegistry,
};

/// Serialized dispatch point for publish lifecycle notifications.
///
/// Producers (the ingest sessions) push events onto an unbounded channel; a single
/// loop delivers them to every registered observer, so per-session ordering is
/// exactly the order the engine emitted. No ordering exists across sessions.
pub struct LifecycleHub {
    observers: Vec<Box<dyn LifecycleObserver>>,
    event_receiver: mpsc::UnboundedReceiver<LifecycleEvent>,
    event_sender: mpsc::UnboundedSender<LifecycleEvent>,
    sessions: HashMap<String, PublishPhase>,
    registry: LiveRegistry,
}

impl LifecycleHub {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            observers: Vec::new(),
            event_receiver: rx,
            event_sender: tx,
            sessions: HashMap::new(),
            registry: LiveRegistry::new(),
        }
    }

    pub fn get_event_sender(&self) -> mpsc::UnboundedSender<LifecycleEvent> {
        self.event_sender.clone()
    }

    pub fn registry(&self) -> LiveRegistry {
        self.registry.clone()
    }

    /// Observers registered before the hub starts see every event.
    pub fn register(&mut self, observer: Box<dyn LifecycleObserver>) {
        self.observers.push(observer);
    }

    pub async fn run(&mut self, cancellation: CancellationToken) -> StreamHubResult<()> {
        tracing::info!("lifecycle hub is running");
        loop {
            tokio::select! {
                _ = cancellation.cancelled() => {
                    tracing::info!("lifecycle hub is shutting down");
                    return Ok(());
                }
                event = self.event_receiver.recv() => match event {
                    None => {
                        tracing::warn!("lifecycle event channel closed, hub is stopping");
                        return Err(StreamHubError::ChannelClosed);
                    }
                    Some(event) => self.process_event(event),
                }
            }
        }
    }

    fn process_event(&mut self, event: LifecycleEvent) {
        let session_id = event.publish_event().session_id.clone();
        let stream_path = event.publish_event().stream_path.clone();
        let target = event.target_phase();

        let current = self
            .sessions
            .get(&session_id)
            .copied()
            .unwrap_or(PublishPhase::Idle);
        let expected = match target {
            PublishPhase::Publishing => current == PublishPhase::Idle,
            PublishPhase::Live => current == PublishPhase::Publishing,
            PublishPhase::Ended => {
                current == PublishPhase::Publishing || current == PublishPhase::Live
            }
            PublishPhase::Idle => false,
        };
        if !expected {
            // The engine guarantees per-session ordering; anything else is a bug
            // upstream. Record it and drop the duplicate/stray event.
            tracing::warn!(
                "unexpected lifecycle transition for session {}: {} -> {}, dropping",
                session_id,
                current,
                target
            );
            return;
        }

        if target == PublishPhase::Ended {
            self.sessions.remove(&session_id);
        } else {
            self.sessions.insert(session_id, target);
        }
        self.registry.set_phase(&stream_path, target);

        self.dispatch(&event);
    }

    fn dispatch(&self, event: &LifecycleEvent) {
        for observer in &self.observers {
            let publish_event = event.publish_event();
            let delivery = catch_unwind(AssertUnwindSafe(|| match event {
                LifecycleEvent::PublishStart(_) => observer.on_publish_start(publish_event),
                LifecycleEvent::PublishConfirmed(_) => observer.on_publish_confirmed(publish_event),
                LifecycleEvent::PublishEnd(_) => observer.on_publish_end(publish_event),
            }));
            if delivery.is_err() {
                tracing::warn!(
                    "lifecycle observer panicked while handling {} for session {}, continuing",
                    event.target_phase(),
                    publish_event.session_id
                );
            }
        }
    }
}

impl Default for LifecycleHub {
    fn default() -> Self {
        Self::new()
    }
}
