//! Route definitions for the `/comments` resource.

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::comment;
use crate::state::AppState;

/// Routes mounted at `/comments`.
///
/// ```text
/// POST   /        -> create
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(comment::create))
        .route("/{id}", delete(comment::delete))
}
