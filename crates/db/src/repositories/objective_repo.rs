//! Repository for the `objectives` table.
//!
//! Objectives have no order column; `ORDER BY id` yields insertion order.

use portfolio_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::project::ObjectiveRow;

const COLUMNS: &str = "id, description_id, text";

pub struct ObjectiveRepo;

impl ObjectiveRepo {
    pub async fn create(
        conn: &mut PgConnection,
        description_id: DbId,
        text: &str,
    ) -> Result<DbId, sqlx::Error> {
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO objectives (description_id, text) VALUES ($1, $2) RETURNING id",
        )
        .bind(description_id)
        .bind(text)
        .fetch_one(conn)
        .await?;
        Ok(row.0)
    }

    pub async fn list_by_description(
        executor: impl PgExecutor<'_>,
        description_id: DbId,
    ) -> Result<Vec<ObjectiveRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM objectives WHERE description_id = $1 ORDER BY id");
        sqlx::query_as::<_, ObjectiveRow>(&query)
            .bind(description_id)
            .fetch_all(executor)
            .await
    }

    pub async fn list(executor: impl PgExecutor<'_>) -> Result<Vec<ObjectiveRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM objectives ORDER BY id");
        sqlx::query_as::<_, ObjectiveRow>(&query)
            .fetch_all(executor)
            .await
    }

    /// Overwrite the text of an objective in place. Returns `false` if the
    /// objective no longer belongs to `description_id`.
    pub async fn update_text(
        conn: &mut PgConnection,
        id: DbId,
        description_id: DbId,
        text: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE objectives SET text = $3 WHERE id = $1 AND description_id = $2")
                .bind(id)
                .bind(description_id)
                .bind(text)
                .execute(conn)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete the listed objectives of one description.
    pub async fn delete_many(
        conn: &mut PgConnection,
        description_id: DbId,
        ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM objectives WHERE description_id = $1 AND id = ANY($2)")
                .bind(description_id)
                .bind(ids)
                .execute(conn)
                .await?;
        Ok(result.rows_affected())
    }

    /// Delete every objective under the project's description.
    pub async fn delete_by_project(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM objectives WHERE description_id IN
                (SELECT id FROM project_descriptions WHERE project_id = $1)",
        )
        .bind(project_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
