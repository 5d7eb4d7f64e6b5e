use std::{collections::HashMap, fmt::Display};

/// Notification payload for one publish lifecycle transition.
///
/// `stream_path` has the shape `/<app>/<streamKey>`, matching the RTMP publish URL
/// the client used. `args` carries whatever extra key/value pairs the client supplied
/// with the publish request; they are forwarded as-is and never interpreted here.
#[derive(Debug, Clone)]
pub struct PublishEvent {
    pub session_id: String,
    pub stream_path: String,
    pub args: HashMap<String, String>,
}

impl PublishEvent {
    pub fn new(session_id: String, stream_path: String) -> Self {
        Self {
            session_id,
            stream_path,
            args: HashMap::new(),
        }
    }

    /// The `<app>` segment of the stream path, if present.
    pub fn app(&self) -> Option<&str> {
        self.stream_path.split('/').find(|s| !s.is_empty())
    }

    /// The `<streamKey>` segment of the stream path, if present.
    pub fn stream_key(&self) -> Option<&str> {
        self.stream_path.split('/').filter(|s| !s.is_empty()).nth(1)
    }
}

/// Per-session publish state, driven externally by the media engine.
///
/// Transitions are strictly `Idle -> Publishing -> Live -> Ended` for one session;
/// the hub observes them, it never gates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishPhase {
    Idle,
    Publishing,
    Live,
    Ended,
}

impl Display for PublishPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Publishing => f.write_str("publishing"),
            Self::Live => f.write_str("live"),
            Self::Ended => f.write_str("ended"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// The client began a publish handshake (prePublish).
    PublishStart(PublishEvent),
    /// The publish request was accepted and media is flowing (postPublish).
    PublishConfirmed(PublishEvent),
    /// The client disconnected or stopped publishing (donePublish).
    PublishEnd(PublishEvent),
}

impl LifecycleEvent {
    pub fn publish_event(&self) -> &PublishEvent {
        match self {
            Self::PublishStart(event) | Self::PublishConfirmed(event) | Self::PublishEnd(event) => {
                event
            }
        }
    }

    /// The phase a session enters when this event is observed.
    pub fn target_phase(&self) -> PublishPhase {
        match self {
            Self::PublishStart(_) => PublishPhase::Publishing,
            Self::PublishConfirmed(_) => PublishPhase::Live,
            Self::PublishEnd(_) => PublishPhase::Ended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_path_segments() {
        let event = PublishEvent::new("s-1".to_owned(), "/live/abc123".to_owned());
        assert_eq!(event.app(), Some("live"));
        assert_eq!(event.stream_key(), Some("abc123"));
    }

    #[test]
    fn malformed_stream_path_yields_none() {
        let event = PublishEvent::new("s-1".to_owned(), "/".to_owned());
        assert_eq!(event.app(), None);
        assert_eq!(event.stream_key(), None);
    }
}
