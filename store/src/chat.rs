use std::collections::VecDeque;

use dashmap::DashMap;
use time::OffsetDateTime;

/// Only the most recent messages per stream are retained.
pub const CHAT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub user: String,
    pub message: String,
    pub is_tip: bool,
    pub amount: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl ChatMessage {
    pub fn new(user: String, message: String, is_tip: bool, amount: f64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: (now.unix_timestamp_nanos() / 1_000_000) as i64,
            user,
            message,
            is_tip,
            amount,
            timestamp: now,
        }
    }
}

/// Chat history keyed by stream id. Implementations are process-local or durable;
/// call sites receive the store by injection, never through a global.
pub trait ChatStore: Send + Sync {
    fn append(&self, stream_id: &str, message: ChatMessage);
    /// Messages in arrival order, oldest first, at most [`CHAT_HISTORY_LIMIT`].
    fn recent(&self, stream_id: &str) -> Vec<ChatMessage>;
}

#[derive(Debug, Default)]
pub struct MemoryChatStore {
    rooms: DashMap<String, VecDeque<ChatMessage>>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChatStore for MemoryChatStore {
    fn append(&self, stream_id: &str, message: ChatMessage) {
        let mut room = self.rooms.entry(stream_id.to_owned()).or_default();
        room.push_back(message);
        while room.len() > CHAT_HISTORY_LIMIT {
            room.pop_front();
        }
    }

    fn recent(&self, stream_id: &str) -> Vec<ChatMessage> {
        self.rooms
            .get(stream_id)
            .map(|room| room.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(user: &str, text: &str) -> ChatMessage {
        ChatMessage::new(user.to_owned(), text.to_owned(), false, 0.0)
    }

    #[test]
    fn recent_returns_messages_in_arrival_order() {
        let store = MemoryChatStore::new();
        store.append("live/abc", message("a", "first"));
        store.append("live/abc", message("b", "second"));

        let messages = store.recent("live/abc");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message, "first");
        assert_eq!(messages[1].message, "second");
    }

    #[test]
    fn history_is_capped_to_the_most_recent() {
        let store = MemoryChatStore::new();
        for i in 0..150 {
            store.append("live/abc", message("a", &format!("msg-{}", i)));
        }

        let messages = store.recent("live/abc");
        assert_eq!(messages.len(), CHAT_HISTORY_LIMIT);
        assert_eq!(messages[0].message, "msg-50");
        assert_eq!(messages.last().unwrap().message, "msg-149");
    }

    #[test]
    fn streams_are_isolated() {
        let store = MemoryChatStore::new();
        store.append("live/abc", message("a", "hello"));

        assert!(store.recent("live/xyz").is_empty());
        assert_eq!(store.recent("live/abc").len(), 1);
    }

    #[test]
    fn tip_fields_survive_serialization() {
        let tip = ChatMessage::new("viewer".to_owned(), "gg".to_owned(), true, 5.0);
        let json = serde_json::to_value(&tip).unwrap();
        assert_eq!(json["isTip"], true);
        assert_eq!(json["amount"], 5.0);
    }
}
