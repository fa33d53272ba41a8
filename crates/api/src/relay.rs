//! Bus-to-WebSocket fan-out.
//!
//! [`ChatRelay`] subscribes to the [`EventBus`](portfolio_events::EventBus)
//! and forwards every event to every connected client as
//! `{"event": <event_type>, "data": <payload>}`.

use std::sync::Arc;

use portfolio_events::PlatformEvent;
use tokio::sync::broadcast;

use crate::ws::protocol::ServerFrame;
use crate::ws::WsManager;

pub struct ChatRelay {
    ws_manager: Arc<WsManager>,
}

impl ChatRelay {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.forward(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Chat relay lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, chat relay shutting down");
                    break;
                }
            }
        }
    }

    async fn forward(&self, event: &PlatformEvent) {
        match ServerFrame::new(&event.event_type, &event.payload).to_message() {
            Ok(message) => {
                let delivered = self.ws_manager.broadcast(message).await;
                tracing::debug!(event_type = %event.event_type, delivered, "Event relayed");
            }
            Err(e) => tracing::error!(
                error = %e,
                event_type = %event.event_type,
                "Failed to encode event"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::ws::Message;
    use portfolio_events::EventBus;

    use super::*;

    #[tokio::test]
    async fn forwards_events_and_stops_when_bus_closes() {
        let ws_manager = Arc::new(WsManager::new());
        let mut rx = ws_manager.add("conn-1".to_string()).await;
        let bus = EventBus::default();
        let handle = tokio::spawn(ChatRelay::new(Arc::clone(&ws_manager)).run(bus.subscribe()));

        bus.publish(PlatformEvent::new("message.received", serde_json::json!({"id": 3})));

        let Some(Message::Text(text)) = rx.recv().await else {
            panic!("expected a text frame");
        };
        let frame: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(frame, serde_json::json!({"event": "message.received", "data": {"id": 3}}));

        drop(bus);
        handle.await.unwrap();
    }
}
