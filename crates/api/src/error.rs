use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use portfolio_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP and WebSocket handlers.
///
/// Wraps [`CoreError`] for domain errors and adds transport-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `portfolio_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A malformed request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Classify into an HTTP status, a stable error code, and a client-safe
    /// message. Internal details are logged here and never returned.
    pub fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::InvalidReference { entity, id } => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_REFERENCE",
                    format!("{entity} with id {id} does not exist"),
                ),
                CoreError::ConcurrencyConflict { entity, id } => (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("{entity} with id {id} was modified concurrently; reload and retry"),
                ),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        }
    }

    /// The `{ "error", "code" }` body shared by HTTP and WebSocket replies.
    pub fn body(&self) -> (StatusCode, serde_json::Value) {
        let (status, code, message) = self.classify();
        (
            status,
            json!({
                "error": message,
                "code": code,
            }),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.body();
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: CoreError) -> StatusCode {
        AppError::from(err).classify().0
    }

    #[test]
    fn core_errors_map_to_statuses() {
        assert_eq!(
            status_of(CoreError::NotFound {
                entity: "Project",
                id: 1
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CoreError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::InvalidReference {
                entity: "Project",
                id: 1
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::ConcurrencyConflict {
                entity: "Project",
                id: 1
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CoreError::Internal("db down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let (_, body) = AppError::from(CoreError::Internal("password=hunter2".into())).body();
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(!body["error"].as_str().unwrap().contains("hunter2"));
    }
}
