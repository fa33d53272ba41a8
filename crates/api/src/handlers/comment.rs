//! Handlers for the `/comments` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use portfolio_core::comment::{validate_new_comment, Comment, NewComment, ENTITY_COMMENT};
use portfolio_core::error::CoreError;
use portfolio_core::store::CommentStore;
use portfolio_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/comments
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    validate_new_comment(&input)?;
    let comment = state.store.insert_comment(&input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/v1/comments/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if state.store.delete_comment(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: ENTITY_COMMENT,
            id,
        }))
    }
}
