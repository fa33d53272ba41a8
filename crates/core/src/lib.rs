//! Portfolio domain core.
//!
//! Holds the entity types, the error taxonomy, and the two pieces of the
//! backend with real behaviour:
//!
//! - [`reconcile::AggregateReconciler`] -- applies a desired-state project
//!   payload against the stored Project -> Description -> Objectives graph.
//! - [`chat::MessageChannel`] -- persists chat messages, then fans them out.
//!
//! Storage and broadcast are reached only through the traits in [`store`];
//! [`memory::MemoryStore`] is the in-process implementation.

pub mod chat;
pub mod comment;
pub mod error;
pub mod memory;
pub mod message;
pub mod project;
pub mod reconcile;
pub mod store;
pub mod types;
