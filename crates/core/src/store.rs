//! Storage and broadcast seams.
//!
//! The core never talks to a database or a socket directly. Every store
//! operation is atomic over the part of the graph it touches; the
//! PostgreSQL implementation lives in `portfolio-db`, the in-process one in
//! [`crate::memory`].

use async_trait::async_trait;

use crate::comment::{Comment, NewComment};
use crate::error::CoreError;
use crate::message::{Message, NewMessage};
use crate::project::{Project, ProjectInput};
use crate::reconcile::ProjectChanges;
use crate::types::DbId;

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// All projects, hydrated with description, objectives and comments.
    async fn list_projects(&self) -> Result<Vec<Project>, CoreError>;

    /// A single hydrated project.
    async fn get_project(&self, id: DbId) -> Result<Option<Project>, CoreError>;

    async fn project_exists(&self, id: DbId) -> Result<bool, CoreError>;

    /// Insert a whole project graph. Every id in `input` is ignored.
    async fn insert_project(&self, input: &ProjectInput) -> Result<Project, CoreError>;

    /// Apply a reconciliation plan as one atomic unit.
    ///
    /// Fails with [`CoreError::ConcurrencyConflict`] when the stored version
    /// no longer equals `changes.expected_version`, and with
    /// [`CoreError::NotFound`] when the project is gone.
    async fn apply_changes(&self, changes: &ProjectChanges) -> Result<(), CoreError>;

    /// Delete a project together with its description, objectives and
    /// comments. Returns `false` if no such project exists.
    async fn delete_project(&self, id: DbId) -> Result<bool, CoreError>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Comments on a project, newest first.
    async fn list_comments(&self, project_id: DbId) -> Result<Vec<Comment>, CoreError>;

    /// Fails with [`CoreError::InvalidReference`] if the project is absent.
    async fn insert_comment(&self, input: &NewComment) -> Result<Comment, CoreError>;

    async fn delete_comment(&self, id: DbId) -> Result<bool, CoreError>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Durably append a message. The store assigns `id` and `sent_at`.
    async fn append_message(&self, input: &NewMessage) -> Result<Message, CoreError>;

    /// At most `limit` messages, newest `sent_at` first, later inserts first
    /// on equal timestamps.
    async fn recent_messages(&self, limit: i64) -> Result<Vec<Message>, CoreError>;
}

/// Everything the HTTP layer needs from a backend.
#[async_trait]
pub trait Store: ProjectStore + CommentStore + MessageStore {
    async fn health_check(&self) -> Result<(), CoreError>;
}

/// Fire-and-forget fan-out to whoever is currently subscribed to `topic`.
pub trait Broadcaster: Send + Sync {
    fn publish(&self, topic: &str, payload: serde_json::Value);
}
