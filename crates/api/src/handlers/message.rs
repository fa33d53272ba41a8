//! Handlers for the `/messages` resource.
//!
//! Posting over HTTP goes through the same [`MessageChannel`] as the
//! WebSocket path, so connected clients see it live.
//!
//! [`MessageChannel`]: portfolio_core::chat::MessageChannel

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use portfolio_core::message::{Message, NewMessage};

use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/messages
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewMessage>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let message = state.chat.post(input.sender_name, input.content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/v1/messages
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Message>>> {
    let messages = state.chat.list().await?;
    Ok(Json(messages))
}
