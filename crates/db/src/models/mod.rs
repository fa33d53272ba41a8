//! Database row structs.
//!
//! Each submodule contains `FromRow` structs matching one table and the
//! conversions into the `portfolio_core` domain types.

pub mod comment;
pub mod message;
pub mod project;
