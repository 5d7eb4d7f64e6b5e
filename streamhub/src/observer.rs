use crate::events::PublishEvent;

/// Callbacks for the three publish lifecycle transitions.
///
/// Observers run on the hub's single dispatch loop and must not block: a slow
/// observer stalls notification delivery for every concurrent stream. A panicking
/// observer is caught by the hub and logged; it never reaches the media engine and
/// never aborts an in-progress publish.
pub trait LifecycleObserver: Send + Sync {
    fn on_publish_start(&self, _event: &PublishEvent) {}
    fn on_publish_confirmed(&self, _event: &PublishEvent) {}
    fn on_publish_end(&self, _event: &PublishEvent) {}
}

/// Default observer: mirrors each transition into the log.
#[derive(Debug, Default)]
pub struct LogObserver;

impl LifecycleObserver for LogObserver {
    fn on_publish_start(&self, event: &PublishEvent) {
        tracing::info!(
            "prePublish id={} StreamPath={} args={:?}",
            event.session_id,
            event.stream_path,
            event.args
        );
    }

    fn on_publish_confirmed(&self, event: &PublishEvent) {
        tracing::info!(
            "postPublish id={} StreamPath={} args={:?}",
            event.session_id,
            event.stream_path,
            event.args
        );
    }

    fn on_publish_end(&self, event: &PublishEvent) {
        tracing::info!(
            "donePublish id={} StreamPath={} args={:?}",
            event.session_id,
            event.stream_path,
            event.args
        );
    }
}
