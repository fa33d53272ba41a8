//! Portfolio event bus.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. It is the live-delivery side of the chat
//!   channel: it implements [`portfolio_core::store::Broadcaster`].
//! - [`PlatformEvent`] -- topic, JSON payload and publish time.

pub mod bus;

pub use bus::{EventBus, PlatformEvent};
