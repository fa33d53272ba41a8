//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use portfolio_core::comment::Comment;
use portfolio_core::error::CoreError;
use portfolio_core::project::{validate_project_input, Project, ProjectInput, ENTITY_PROJECT};
use portfolio_core::reconcile::AggregateReconciler;
use portfolio_core::store::{CommentStore, ProjectStore};
use portfolio_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: ENTITY_PROJECT,
        id,
    })
}

/// POST /api/v1/projects
///
/// Ids anywhere in the payload are ignored; the store assigns fresh ones.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<ProjectInput>,
) -> AppResult<(StatusCode, Json<Project>)> {
    validate_project_input(&input)?;
    let project = state.store.insert_project(&input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    let projects = state.store.list_projects().await?;
    Ok(Json(projects))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = state
        .store
        .get_project(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(project))
}

/// PUT /api/v1/projects/{id}
///
/// Reconciles the stored aggregate against the full desired state in the
/// body and returns the result as stored.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ProjectInput>,
) -> AppResult<Json<Project>> {
    let project = AggregateReconciler::new(state.store.as_ref())
        .update(id, &input)
        .await?;
    Ok(Json(project))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if state.store.delete_project(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/projects/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Comment>>> {
    if !state.store.project_exists(id).await? {
        return Err(not_found(id));
    }
    let comments = state.store.list_comments(id).await?;
    Ok(Json(comments))
}
