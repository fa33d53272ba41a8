pub mod comment;
pub mod health;
pub mod message;
pub mod project;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                          WebSocket (chat)
///
/// /projects                    list, create
/// /projects/{id}               get, update, delete
/// /projects/{id}/comments      list comments
///
/// /comments                    create
/// /comments/{id}               delete
///
/// /messages                    recent history, send
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/projects", project::router())
        .nest("/comments", comment::router())
        .nest("/messages", message::router())
}
