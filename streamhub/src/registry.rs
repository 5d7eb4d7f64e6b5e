use std::sync::Arc;

use dashmap::DashMap;

use crate::events::PublishPhase;

/// Shared view of which stream paths currently have a publisher, keyed by stream
/// path. Written by the hub's dispatch loop, read by the status API.
#[derive(Debug, Default, Clone)]
pub struct LiveRegistry {
    streams: Arc<DashMap<String, PublishPhase>>,
}

impl LiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_phase(&self, stream_path: &str, phase: PublishPhase) {
        match phase {
            PublishPhase::Ended => {
                self.streams.remove(stream_path);
            }
            _ => {
                self.streams.insert(stream_path.to_owned(), phase);
            }
        }
    }

    pub fn is_live(&self, stream_path: &str) -> bool {
        self.streams
            .get(stream_path)
            .map(|phase| *phase == PublishPhase::Live)
            .unwrap_or(false)
    }

    /// Stream paths with an accepted, flowing publisher.
    pub fn live_streams(&self) -> Vec<String> {
        self.streams
            .iter()
            .filter(|entry| *entry.value() == PublishPhase::Live)
            .map(|entry| entry.key().clone())
            .collect()
    }
}
