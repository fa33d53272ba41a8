use std::sync::Arc;

use portfolio_core::chat::MessageChannel;
use portfolio_core::store::Store;
use portfolio_events::EventBus;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Backing store (PostgreSQL or in-memory).
    pub store: Arc<dyn Store>,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Event bus carrying broadcast chat messages.
    pub event_bus: Arc<EventBus>,
    /// Persist-then-broadcast chat entry point.
    pub chat: Arc<MessageChannel>,
}

impl AppState {
    /// Wire the chat channel to `store` and `event_bus`.
    pub fn new<S: Store + 'static>(
        store: Arc<S>,
        config: ServerConfig,
        ws_manager: Arc<WsManager>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let chat = Arc::new(MessageChannel::new(store.clone(), event_bus.clone()));
        Self {
            store,
            config: Arc::new(config),
            ws_manager,
            event_bus,
            chat,
        }
    }
}
