//! Repository for the `comments` table.

use portfolio_core::comment::NewComment;
use portfolio_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::comment::CommentRow;

const COLUMNS: &str = "id, project_id, content, author_name, created_at";

pub struct CommentRepo;

impl CommentRepo {
    /// Insert a comment. `created_at` comes from the database clock.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &NewComment,
    ) -> Result<CommentRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (project_id, content, author_name)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CommentRow>(&query)
            .bind(input.project_id)
            .bind(&input.content)
            .bind(&input.author_name)
            .fetch_one(executor)
            .await
    }

    /// Comments on one project, newest first.
    pub async fn list_by_project(
        executor: impl PgExecutor<'_>,
        project_id: DbId,
    ) -> Result<Vec<CommentRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments WHERE project_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, CommentRow>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await
    }

    /// All comments, newest first.
    pub async fn list(executor: impl PgExecutor<'_>) -> Result<Vec<CommentRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, CommentRow>(&query)
            .fetch_all(executor)
            .await
    }

    /// Delete a comment by ID. Returns `true` if a row was removed.
    pub async fn delete(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_by_project(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE project_id = $1")
            .bind(project_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
