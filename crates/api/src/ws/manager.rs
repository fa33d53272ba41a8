use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Registry of live WebSocket connections keyed by connection id.
///
/// Only the WebSocket handler adds and removes entries; everything else
/// just sends.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsSender>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection and return the receiver its writer task drains.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut conns = self.connections.write().await;
        conns.insert(conn_id, tx);
        tracing::debug!(count = conns.len(), "WebSocket connection registered");
        rx
    }

    /// Remove a connection by its ID. Unknown IDs are ignored.
    pub async fn remove(&self, conn_id: &str) {
        let mut conns = self.connections.write().await;
        if conns.remove(conn_id).is_some() {
            tracing::debug!(count = conns.len(), "WebSocket connection removed");
        }
    }

    /// Queue a message for one connection. Returns `false` if it is gone.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        match self.connections.read().await.get(conn_id) {
            Some(sender) => sender.send(message).is_ok(),
            None => false,
        }
    }

    /// Queue a message for every connection and return how many accepted it.
    ///
    /// Closed channels are skipped; their handler removes them on exit.
    pub async fn broadcast(&self, message: Message) -> usize {
        let conns = self.connections.read().await;
        conns
            .values()
            .filter(|sender| sender.send(message.clone()).is_ok())
            .count()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the registry.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for sender in conns.values() {
            let _ = sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connection.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for sender in conns.values() {
            let _ = sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
