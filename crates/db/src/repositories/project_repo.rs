//! Repository for the `projects` table.

use portfolio_core::project::ProjectFields;
use portfolio_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgConnection, PgExecutor};

use crate::models::project::ProjectRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, technologies, role, dash, thumbnail, \
    release_status, maintain_status, date, version, created_at, updated_at";

/// Provides row-level operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project at version 1, returning its id.
    pub async fn create(conn: &mut PgConnection, fields: &ProjectFields) -> Result<DbId, sqlx::Error> {
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO projects
                (title, description, technologies, role, dash, thumbnail,
                 release_status, maintain_status, date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING id",
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(Json(&fields.technologies))
        .bind(&fields.role)
        .bind(&fields.dash)
        .bind(&fields.thumbnail)
        .bind(&fields.release_status)
        .bind(&fields.maintain_status)
        .bind(&fields.date)
        .fetch_one(conn)
        .await?;
        Ok(row.0)
    }

    /// Find a project by its ID.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List all projects in creation order.
    pub async fn list(executor: impl PgExecutor<'_>) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY id");
        sqlx::query_as::<_, ProjectRow>(&query)
            .fetch_all(executor)
            .await
    }

    pub async fn exists(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }

    /// Take the row lock on a project for the rest of the transaction.
    ///
    /// Returns `false` if the project does not exist.
    pub async fn lock(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as("SELECT id FROM projects WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(row.is_some())
    }

    /// Replace every scalar column and bump the version, but only if the
    /// stored version still equals `expected_version`.
    ///
    /// Returns `false` when no row matched (missing project or stale version).
    pub async fn update_versioned(
        conn: &mut PgConnection,
        id: DbId,
        expected_version: i32,
        fields: &ProjectFields,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET
                title = $3,
                description = $4,
                technologies = $5,
                role = $6,
                dash = $7,
                thumbnail = $8,
                release_status = $9,
                maintain_status = $10,
                date = $11,
                version = version + 1,
                updated_at = NOW()
             WHERE id = $1 AND version = $2",
        )
        .bind(id)
        .bind(expected_version)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(Json(&fields.technologies))
        .bind(&fields.role)
        .bind(&fields.dash)
        .bind(&fields.thumbnail)
        .bind(&fields.release_status)
        .bind(&fields.maintain_status)
        .bind(&fields.date)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete the project row itself. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
