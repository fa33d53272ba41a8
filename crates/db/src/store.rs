//! [`PgStore`]: the PostgreSQL implementation of the core store traits.
//!
//! Aggregate reads run inside a `REPEATABLE READ READ ONLY` transaction so a
//! project is never hydrated from a mix of committed states. Every write
//! path runs in a single transaction; `apply_changes` guards it with the
//! project's `version` column.
//!
//! Writes to an aggregate lock its `projects` row before touching any child
//! row, so concurrent updates and deletes of one project queue on that lock.

use std::collections::HashMap;

use async_trait::async_trait;
use portfolio_core::comment::{Comment, NewComment, ENTITY_COMMENT};
use portfolio_core::error::CoreError;
use portfolio_core::message::{Message, NewMessage};
use portfolio_core::project::{Project, ProjectInput, ENTITY_DESCRIPTION, ENTITY_PROJECT};
use portfolio_core::reconcile::{DescriptionChange, ProjectChanges};
use portfolio_core::store::{CommentStore, MessageStore, ProjectStore, Store};
use portfolio_core::types::DbId;
use sqlx::PgConnection;

use crate::models::project::{DescriptionRow, ObjectiveRow, ProjectRow};
use crate::repositories::{CommentRepo, DescriptionRepo, MessageRepo, ObjectiveRepo, ProjectRepo};
use crate::DbPool;

/// PostgreSQL foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// PostgreSQL unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL serialization failure.
const SERIALIZATION_FAILURE: &str = "40001";
/// PostgreSQL deadlock detected.
const DEADLOCK_DETECTED: &str = "40P01";

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn snapshot(&self) -> Result<sqlx::Transaction<'static, sqlx::Postgres>, CoreError> {
        let mut tx = self.pool.begin().await.map_err(internal)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(internal)?;
        Ok(tx)
    }
}

/// Surface a database failure as [`CoreError::Internal`]. The API layer logs it.
fn internal(err: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("Database error: {err}"))
}

/// Map a failure inside a write to project `id`. Transactions aborted by
/// Postgres because of a competing writer become conflicts.
fn write_error(err: sqlx::Error, id: DbId) -> CoreError {
    if has_code(&err, DEADLOCK_DETECTED) || has_code(&err, SERIALIZATION_FAILURE) {
        tracing::warn!(project_id = id, error = %err, "Write aborted by a concurrent transaction");
        return CoreError::ConcurrencyConflict {
            entity: ENTITY_PROJECT,
            id,
        };
    }
    internal(err)
}

fn has_code(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(code),
        _ => false,
    }
}

/// Load one project's description, objectives and comments on `conn`.
async fn hydrate(conn: &mut PgConnection, row: ProjectRow) -> Result<Project, sqlx::Error> {
    let desc = match DescriptionRepo::find_by_project(&mut *conn, row.id).await? {
        Some(desc_row) => {
            let objectives = ObjectiveRepo::list_by_description(&mut *conn, desc_row.id).await?;
            Some(desc_row.into_description(objectives))
        }
        None => None,
    };
    let comments = CommentRepo::list_by_project(&mut *conn, row.id)
        .await?
        .into_iter()
        .map(Comment::from)
        .collect();
    Ok(row.into_project(desc, comments))
}

/// Group description, objective and comment rows under their projects.
fn assemble(
    projects: Vec<ProjectRow>,
    descriptions: Vec<DescriptionRow>,
    objectives: Vec<ObjectiveRow>,
    comments: Vec<Comment>,
) -> Vec<Project> {
    let mut objectives_by_desc: HashMap<DbId, Vec<ObjectiveRow>> = HashMap::new();
    for objective in objectives {
        objectives_by_desc
            .entry(objective.description_id)
            .or_default()
            .push(objective);
    }

    let mut desc_by_project = HashMap::new();
    for desc in descriptions {
        let objectives = objectives_by_desc.remove(&desc.id).unwrap_or_default();
        desc_by_project.insert(desc.project_id, desc.into_description(objectives));
    }

    let mut comments_by_project: HashMap<DbId, Vec<Comment>> = HashMap::new();
    for comment in comments {
        comments_by_project
            .entry(comment.project_id)
            .or_default()
            .push(comment);
    }

    projects
        .into_iter()
        .map(|row| {
            let desc = desc_by_project.remove(&row.id);
            let comments = comments_by_project.remove(&row.id).unwrap_or_default();
            row.into_project(desc, comments)
        })
        .collect()
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn list_projects(&self) -> Result<Vec<Project>, CoreError> {
        let mut tx = self.snapshot().await?;
        let projects = ProjectRepo::list(&mut *tx).await.map_err(internal)?;
        let descriptions = DescriptionRepo::list(&mut *tx).await.map_err(internal)?;
        let objectives = ObjectiveRepo::list(&mut *tx).await.map_err(internal)?;
        let comments = CommentRepo::list(&mut *tx)
            .await
            .map_err(internal)?
            .into_iter()
            .map(Comment::from)
            .collect();
        tx.commit().await.map_err(internal)?;

        Ok(assemble(projects, descriptions, objectives, comments))
    }

    async fn get_project(&self, id: DbId) -> Result<Option<Project>, CoreError> {
        let mut tx = self.snapshot().await?;
        let project = match ProjectRepo::find_by_id(&mut *tx, id)
            .await
            .map_err(internal)?
        {
            Some(row) => Some(hydrate(&mut tx, row).await.map_err(internal)?),
            None => None,
        };
        tx.commit().await.map_err(internal)?;
        Ok(project)
    }

    async fn project_exists(&self, id: DbId) -> Result<bool, CoreError> {
        ProjectRepo::exists(&self.pool, id).await.map_err(internal)
    }

    async fn insert_project(&self, input: &ProjectInput) -> Result<Project, CoreError> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        let project_id = ProjectRepo::create(&mut tx, &input.fields)
            .await
            .map_err(internal)?;
        if let Some(desc) = &input.desc {
            let desc_id = DescriptionRepo::create(&mut tx, project_id, &desc.fields)
                .await
                .map_err(internal)?;
            for objective in &desc.objectives {
                ObjectiveRepo::create(&mut tx, desc_id, &objective.text)
                    .await
                    .map_err(internal)?;
            }
        }

        let row = ProjectRepo::find_by_id(&mut *tx, project_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| CoreError::Internal(format!("Project {project_id} vanished on insert")))?;
        let project = hydrate(&mut tx, row).await.map_err(internal)?;
        tx.commit().await.map_err(internal)?;

        tracing::info!(project_id, "Project created");
        Ok(project)
    }

    async fn apply_changes(&self, changes: &ProjectChanges) -> Result<(), CoreError> {
        let id = changes.project_id;
        let mut tx = self.pool.begin().await.map_err(|e| write_error(e, id))?;

        let bumped = ProjectRepo::update_versioned(&mut tx, id, changes.expected_version, &changes.fields)
            .await
            .map_err(|e| write_error(e, id))?;
        if !bumped {
            let exists = ProjectRepo::exists(&mut *tx, id).await.map_err(|e| write_error(e, id))?;
            // Dropping `tx` rolls back.
            return Err(if exists {
                CoreError::ConcurrencyConflict {
                    entity: ENTITY_PROJECT,
                    id,
                }
            } else {
                CoreError::NotFound {
                    entity: ENTITY_PROJECT,
                    id,
                }
            });
        }

        match &changes.description {
            DescriptionChange::Keep => {}
            DescriptionChange::Update {
                id: desc_id,
                fields,
                objectives,
            } => {
                let found = DescriptionRepo::update(&mut tx, *desc_id, id, fields)
                    .await
                    .map_err(|e| write_error(e, id))?;
                if !found {
                    return Err(CoreError::NotFound {
                        entity: ENTITY_DESCRIPTION,
                        id: *desc_id,
                    });
                }
                if !objectives.delete.is_empty() {
                    ObjectiveRepo::delete_many(&mut tx, *desc_id, &objectives.delete)
                        .await
                        .map_err(|e| write_error(e, id))?;
                }
                for objective in &objectives.update {
                    let found = ObjectiveRepo::update_text(&mut tx, objective.id, *desc_id, &objective.text)
                        .await
                        .map_err(|e| write_error(e, id))?;
                    if !found {
                        return Err(CoreError::ConcurrencyConflict {
                            entity: ENTITY_PROJECT,
                            id,
                        });
                    }
                }
                for text in &objectives.insert {
                    ObjectiveRepo::create(&mut tx, *desc_id, text)
                        .await
                        .map_err(|e| write_error(e, id))?;
                }
            }
            DescriptionChange::Create { fields, objectives } => {
                // A description created since the plan was made trips the
                // unique index on project_id.
                let desc_id = match DescriptionRepo::create(&mut tx, id, fields).await {
                    Ok(desc_id) => desc_id,
                    Err(err) if has_code(&err, UNIQUE_VIOLATION) => {
                        return Err(CoreError::ConcurrencyConflict {
                            entity: ENTITY_DESCRIPTION,
                            id,
                        });
                    }
                    Err(err) => return Err(write_error(err, id)),
                };
                for text in objectives {
                    ObjectiveRepo::create(&mut tx, desc_id, text)
                        .await
                        .map_err(|e| write_error(e, id))?;
                }
            }
        }

        tx.commit().await.map_err(|e| write_error(e, id))?;
        Ok(())
    }

    async fn delete_project(&self, id: DbId) -> Result<bool, CoreError> {
        let mut tx = self.pool.begin().await.map_err(|e| write_error(e, id))?;

        // Project row first, matching the lock order of `apply_changes`.
        if !ProjectRepo::lock(&mut tx, id).await.map_err(|e| write_error(e, id))? {
            return Ok(false);
        }

        // Children next; the cascades cover the same ground.
        let objectives = ObjectiveRepo::delete_by_project(&mut tx, id)
            .await
            .map_err(|e| write_error(e, id))?;
        DescriptionRepo::delete_by_project(&mut tx, id)
            .await
            .map_err(|e| write_error(e, id))?;
        let comments = CommentRepo::delete_by_project(&mut tx, id)
            .await
            .map_err(|e| write_error(e, id))?;
        let deleted = ProjectRepo::delete(&mut tx, id)
            .await
            .map_err(|e| write_error(e, id))?;

        tx.commit().await.map_err(|e| write_error(e, id))?;

        if deleted {
            tracing::info!(project_id = id, objectives, comments, "Project deleted");
        }
        Ok(deleted)
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn list_comments(&self, project_id: DbId) -> Result<Vec<Comment>, CoreError> {
        let rows = CommentRepo::list_by_project(&self.pool, project_id)
            .await
            .map_err(internal)?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn insert_comment(&self, input: &NewComment) -> Result<Comment, CoreError> {
        match CommentRepo::create(&self.pool, input).await {
            Ok(row) => Ok(row.into()),
            Err(err) if has_code(&err, FOREIGN_KEY_VIOLATION) => Err(CoreError::InvalidReference {
                entity: ENTITY_PROJECT,
                id: input.project_id,
            }),
            Err(err) => Err(internal(err)),
        }
    }

    async fn delete_comment(&self, id: DbId) -> Result<bool, CoreError> {
        let deleted = CommentRepo::delete(&self.pool, id).await.map_err(internal)?;
        if deleted {
            tracing::debug!(entity = ENTITY_COMMENT, id, "Row deleted");
        }
        Ok(deleted)
    }
}

#[async_trait]
impl MessageStore for PgStore {
    async fn append_message(&self, input: &NewMessage) -> Result<Message, CoreError> {
        MessageRepo::create(&self.pool, input)
            .await
            .map(Message::from)
            .map_err(internal)
    }

    async fn recent_messages(&self, limit: i64) -> Result<Vec<Message>, CoreError> {
        let rows = MessageRepo::list_recent(&self.pool, limit)
            .await
            .map_err(internal)?;
        Ok(rows.into_iter().map(Message::from).collect())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(internal)
    }
}
