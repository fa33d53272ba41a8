//! WebSocket infrastructure for the live chat.
//!
//! Provides connection management, the wire frames, heartbeat pings, and
//! the HTTP upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;
pub mod protocol;

pub use handler::ws_handler;
pub use heartbeat::{start_heartbeat, HEARTBEAT_INTERVAL};
pub use manager::WsManager;
