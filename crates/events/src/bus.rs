//! Live delivery of stored chat messages.
//!
//! [`MessageChannel`](portfolio_core::chat::MessageChannel) hands each
//! message to the [`Broadcaster`] only after it is durable; the [`EventBus`]
//! turns that call into a [`PlatformEvent`] on a `tokio::sync::broadcast`
//! channel, where the WebSocket relay picks it up. Nothing here is
//! persisted, so a receiver that subscribes late catches up through the
//! message history instead.

use chrono::{DateTime, Utc};
use portfolio_core::store::Broadcaster;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events buffered per receiver before the slowest one starts lagging.
const DEFAULT_CAPACITY: usize = 1024;

/// Topic plus JSON body, stamped when it enters the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Topic such as `"message.received"`.
    pub event_type: String,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
            timestamp: Utc::now(),
        }
    }
}

/// Fan-out from one publisher side to every connected relay.
///
/// A receiver that falls more than `capacity` events behind gets
/// `RecvError::Lagged` and skips ahead.
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Send `event` to current receivers; with none, it is dropped.
    pub fn publish(&self, event: PlatformEvent) {
        if let Err(e) = self.sender.send(event) {
            tracing::debug!(event_type = %e.0.event_type, "No subscribers for event");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Broadcaster for EventBus {
    fn publish(&self, topic: &str, payload: serde_json::Value) {
        EventBus::publish(self, PlatformEvent::new(topic, payload));
    }
}
