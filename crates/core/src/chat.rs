//! Chat message persistence and live fan-out.
//!
//! [`MessageChannel::post`] appends to the [`MessageStore`] and only after
//! the store has acknowledged the write hands the stored message to the
//! [`Broadcaster`]. Late subscribers catch up through
//! [`MessageChannel::list`].

use std::sync::Arc;

use crate::error::CoreError;
use crate::message::{validate_new_message, Message, NewMessage};
use crate::store::{Broadcaster, MessageStore};

/// Event tag attached to every broadcast chat message.
pub const MESSAGE_RECEIVED: &str = "message.received";

/// Number of messages returned by the history read.
pub const HISTORY_LIMIT: i64 = 50;

pub struct MessageChannel {
    store: Arc<dyn MessageStore>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl MessageChannel {
    pub fn new(store: Arc<dyn MessageStore>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { store, broadcaster }
    }

    /// Persist a message, then broadcast it to current subscribers.
    ///
    /// Broadcast problems are logged and do not fail the call; the message
    /// is already durable at that point.
    pub async fn post(
        &self,
        sender_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Message, CoreError> {
        let input = NewMessage::new(sender_name, content);
        validate_new_message(&input)?;

        let message = self.store.append_message(&input).await?;
        tracing::debug!(message_id = message.id, sender = %message.sender_name, "Message stored");

        match serde_json::to_value(&message) {
            Ok(payload) => self.broadcaster.publish(MESSAGE_RECEIVED, payload),
            Err(e) => tracing::warn!(
                error = %e,
                message_id = message.id,
                "Failed to serialize message for broadcast"
            ),
        }

        Ok(message)
    }

    /// The most recent [`HISTORY_LIMIT`] messages, newest first.
    pub async fn list(&self) -> Result<Vec<Message>, CoreError> {
        self.store.recent_messages(HISTORY_LIMIT).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;

    use super::*;
    use crate::memory::MemoryStore;

    /// Records every publish together with the store contents at that moment.
    struct Recorder {
        store: Arc<MemoryStore>,
        seen: Mutex<Vec<(String, serde_json::Value, usize)>>,
    }

    impl Broadcaster for Recorder {
        fn publish(&self, topic: &str, payload: serde_json::Value) {
            let stored = self.store.message_count();
            self.seen
                .lock()
                .unwrap()
                .push((topic.to_string(), payload, stored));
        }
    }

    fn channel() -> (MessageChannel, Arc<MemoryStore>, Arc<Recorder>) {
        let store = Arc::new(MemoryStore::new());
        let recorder = Arc::new(Recorder {
            store: Arc::clone(&store),
            seen: Mutex::new(Vec::new()),
        });
        let channel = MessageChannel::new(store.clone(), recorder.clone());
        (channel, store, recorder)
    }

    #[tokio::test]
    async fn post_stores_before_broadcasting() {
        let (channel, _store, recorder) = channel();

        let message = channel.post("Alice", "hi").await.unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (topic, payload, stored_at_publish) = &seen[0];
        assert_eq!(topic, MESSAGE_RECEIVED);
        assert_eq!(payload["id"], message.id);
        assert_eq!(payload["sender_name"], "Alice");
        assert!(payload["sent_at"].is_string());
        assert_eq!(*stored_at_publish, 1);
    }

    #[tokio::test]
    async fn posted_message_is_listed_without_any_subscriber() {
        let (channel, _store, _recorder) = channel();

        channel.post("Alice", "hi").await.unwrap();

        let history = channel.list().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "hi");
    }

    #[tokio::test]
    async fn invalid_message_is_neither_stored_nor_broadcast() {
        let (channel, store, recorder) = channel();

        let err = channel.post("Alice", "").await.unwrap_err();

        assert_matches!(err, CoreError::Validation(_));
        assert_eq!(store.message_count(), 0);
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_is_bounded_and_newest_first() {
        let (channel, _store, _recorder) = channel();

        for i in 0..60 {
            channel.post("bot", format!("msg {i}")).await.unwrap();
        }

        let history = channel.list().await.unwrap();
        assert_eq!(history.len(), 50);
        assert_eq!(history[0].content, "msg 59");
        assert_eq!(history[49].content, "msg 10");
        assert!(history.windows(2).all(|w| w[0].sent_at >= w[1].sent_at));
    }
}
