use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Concurrency conflict: {entity} with id {id} was modified since it was read")]
    ConcurrencyConflict { entity: &'static str, id: DbId },

    #[error("Invalid reference: {entity} with id {id} does not exist")]
    InvalidReference { entity: &'static str, id: DbId },

    #[error("Internal error: {0}")]
    Internal(String),
}
