//! Rows of the `comments` table.

use portfolio_core::comment::Comment;
use portfolio_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: DbId,
    pub project_id: DbId,
    pub content: String,
    pub author_name: String,
    pub created_at: Timestamp,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            author_name: row.author_name,
            project_id: row.project_id,
            created_at: row.created_at,
        }
    }
}
