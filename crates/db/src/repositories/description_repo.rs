//! Repository for the `project_descriptions` table.

use portfolio_core::project::DescriptionFields;
use portfolio_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::project::DescriptionRow;

const COLUMNS: &str = "id, project_id, title, summary, footer";

pub struct DescriptionRepo;

impl DescriptionRepo {
    pub async fn create(
        conn: &mut PgConnection,
        project_id: DbId,
        fields: &DescriptionFields,
    ) -> Result<DbId, sqlx::Error> {
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO project_descriptions (project_id, title, summary, footer)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(project_id)
        .bind(&fields.title)
        .bind(&fields.summary)
        .bind(&fields.footer)
        .fetch_one(conn)
        .await?;
        Ok(row.0)
    }

    pub async fn find_by_project(
        executor: impl PgExecutor<'_>,
        project_id: DbId,
    ) -> Result<Option<DescriptionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_descriptions WHERE project_id = $1");
        sqlx::query_as::<_, DescriptionRow>(&query)
            .bind(project_id)
            .fetch_optional(executor)
            .await
    }

    pub async fn list(executor: impl PgExecutor<'_>) -> Result<Vec<DescriptionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_descriptions ORDER BY id");
        sqlx::query_as::<_, DescriptionRow>(&query)
            .fetch_all(executor)
            .await
    }

    /// Overwrite the scalar columns of the description owned by `project_id`.
    ///
    /// Returns `false` if the description is gone or belongs elsewhere.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        project_id: DbId,
        fields: &DescriptionFields,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE project_descriptions SET title = $3, summary = $4, footer = $5
             WHERE id = $1 AND project_id = $2",
        )
        .bind(id)
        .bind(project_id)
        .bind(&fields.title)
        .bind(&fields.summary)
        .bind(&fields.footer)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_by_project(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_descriptions WHERE project_id = $1")
            .bind(project_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
