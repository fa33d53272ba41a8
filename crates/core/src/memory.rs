//! In-process store.
//!
//! Rows live in per-entity arenas keyed by id, with explicit parent ->
//! children indexes (project -> description, description -> objectives,
//! project -> comments). Every mutation takes the single write lock and
//! checks all preconditions before touching any table, so a failed call
//! leaves no partial change behind.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::comment::{Comment, NewComment};
use crate::error::CoreError;
use crate::message::{Message, NewMessage};
use crate::project::{
    DescriptionFields, Objective, Project, ProjectDescription, ProjectFields, ProjectInput,
    ENTITY_DESCRIPTION, ENTITY_PROJECT,
};
use crate::reconcile::{DescriptionChange, ProjectChanges};
use crate::store::{CommentStore, MessageStore, ProjectStore, Store};
use crate::types::{DbId, Timestamp};

struct ProjectRow {
    fields: ProjectFields,
    version: i32,
    created_at: Timestamp,
}

struct DescriptionRow {
    project_id: DbId,
    fields: DescriptionFields,
}

struct ObjectiveRow {
    description_id: DbId,
    text: String,
}

/// Per-table id sequences. Ids start at 1 and are never reused.
#[derive(Default)]
struct Sequences {
    project: DbId,
    description: DbId,
    objective: DbId,
    comment: DbId,
    message: DbId,
}

fn next(seq: &mut DbId) -> DbId {
    *seq += 1;
    *seq
}

#[derive(Default)]
struct Tables {
    seq: Sequences,
    projects: BTreeMap<DbId, ProjectRow>,
    descriptions: BTreeMap<DbId, DescriptionRow>,
    objectives: BTreeMap<DbId, ObjectiveRow>,
    comments: BTreeMap<DbId, Comment>,
    messages: Vec<Message>,
    /// project id -> description id
    description_of: HashMap<DbId, DbId>,
    /// description id -> objective ids in insertion order
    objectives_of: HashMap<DbId, Vec<DbId>>,
    /// project id -> comment ids
    comments_of: HashMap<DbId, Vec<DbId>>,
}

impl Tables {
    fn hydrate(&self, id: DbId) -> Option<Project> {
        let row = self.projects.get(&id)?;

        let desc = self.description_of.get(&id).and_then(|&desc_id| {
            let desc_row = self.descriptions.get(&desc_id)?;
            let objectives = self
                .objectives_of
                .get(&desc_id)
                .map(|ids| {
                    ids.iter()
                        .filter_map(|oid| {
                            self.objectives.get(oid).map(|o| Objective {
                                id: *oid,
                                text: o.text.clone(),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            Some(ProjectDescription {
                id: desc_id,
                fields: desc_row.fields.clone(),
                objectives,
            })
        });

        Some(Project {
            id,
            fields: row.fields.clone(),
            desc,
            comments: self.comments_for(id),
            version: row.version,
            created_at: row.created_at,
        })
    }

    fn comments_for(&self, project_id: DbId) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .comments_of
            .get(&project_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.comments.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        comments
    }

    fn insert_description(
        &mut self,
        project_id: DbId,
        fields: &DescriptionFields,
        objectives: &[String],
    ) {
        let desc_id = next(&mut self.seq.description);
        self.descriptions.insert(
            desc_id,
            DescriptionRow {
                project_id,
                fields: fields.clone(),
            },
        );
        self.description_of.insert(project_id, desc_id);
        self.objectives_of.insert(desc_id, Vec::new());
        for text in objectives {
            self.insert_objective(desc_id, text);
        }
    }

    fn insert_objective(&mut self, description_id: DbId, text: &str) {
        let id = next(&mut self.seq.objective);
        self.objectives.insert(
            id,
            ObjectiveRow {
                description_id,
                text: text.to_string(),
            },
        );
        self.objectives_of.entry(description_id).or_default().push(id);
    }

    /// Check that `changes` can be applied to the current tables.
    fn check(&self, changes: &ProjectChanges) -> Result<(), CoreError> {
        let id = changes.project_id;
        let row = self.projects.get(&id).ok_or(CoreError::NotFound {
            entity: ENTITY_PROJECT,
            id,
        })?;
        if row.version != changes.expected_version {
            return Err(CoreError::ConcurrencyConflict {
                entity: ENTITY_PROJECT,
                id,
            });
        }

        match &changes.description {
            DescriptionChange::Keep => {}
            DescriptionChange::Create { .. } => {
                if self.description_of.contains_key(&id) {
                    return Err(CoreError::ConcurrencyConflict {
                        entity: ENTITY_DESCRIPTION,
                        id,
                    });
                }
            }
            DescriptionChange::Update {
                id: desc_id,
                objectives,
                ..
            } => {
                let owned = self
                    .descriptions
                    .get(desc_id)
                    .is_some_and(|d| d.project_id == id);
                let touched = objectives
                    .delete
                    .iter()
                    .chain(objectives.update.iter().map(|o| &o.id));
                let children_owned = touched.into_iter().all(|oid| {
                    self.objectives
                        .get(oid)
                        .is_some_and(|o| o.description_id == *desc_id)
                });
                if !owned || !children_owned {
                    return Err(CoreError::ConcurrencyConflict {
                        entity: ENTITY_DESCRIPTION,
                        id: *desc_id,
                    });
                }
            }
        }
        Ok(())
    }

    fn remove_project(&mut self, id: DbId) -> bool {
        if self.projects.remove(&id).is_none() {
            return false;
        }
        if let Some(desc_id) = self.description_of.remove(&id) {
            self.descriptions.remove(&desc_id);
            for oid in self.objectives_of.remove(&desc_id).unwrap_or_default() {
                self.objectives.remove(&oid);
            }
        }
        for cid in self.comments_of.remove(&id).unwrap_or_default() {
            self.comments.remove(&cid);
        }
        true
    }
}

/// Store backed by process memory. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row counts for `(descriptions, objectives, comments)` across all projects.
    #[cfg(test)]
    pub(crate) async fn child_row_counts(&self) -> (usize, usize, usize) {
        let tables = self.tables.read().await;
        (
            tables.descriptions.len(),
            tables.objectives.len(),
            tables.comments.len(),
        )
    }

    #[cfg(test)]
    pub(crate) fn message_count(&self) -> usize {
        self.tables
            .try_read()
            .map(|t| t.messages.len())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list_projects(&self) -> Result<Vec<Project>, CoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .keys()
            .filter_map(|&id| tables.hydrate(id))
            .collect())
    }

    async fn get_project(&self, id: DbId) -> Result<Option<Project>, CoreError> {
        Ok(self.tables.read().await.hydrate(id))
    }

    async fn project_exists(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.tables.read().await.projects.contains_key(&id))
    }

    async fn insert_project(&self, input: &ProjectInput) -> Result<Project, CoreError> {
        let mut tables = self.tables.write().await;
        let id = next(&mut tables.seq.project);
        tables.projects.insert(
            id,
            ProjectRow {
                fields: input.fields.clone(),
                version: 1,
                created_at: Utc::now(),
            },
        );
        if let Some(desc) = &input.desc {
            let texts: Vec<String> = desc.objectives.iter().map(|o| o.text.clone()).collect();
            tables.insert_description(id, &desc.fields, &texts);
        }
        tables
            .hydrate(id)
            .ok_or_else(|| CoreError::Internal(format!("Project {id} vanished during insert")))
    }

    async fn apply_changes(&self, changes: &ProjectChanges) -> Result<(), CoreError> {
        let mut tables = self.tables.write().await;
        tables.check(changes)?;

        let id = changes.project_id;
        if let Some(row) = tables.projects.get_mut(&id) {
            row.fields = changes.fields.clone();
            row.version += 1;
        }

        match &changes.description {
            DescriptionChange::Keep => {}
            DescriptionChange::Create { fields, objectives } => {
                tables.insert_description(id, fields, objectives);
            }
            DescriptionChange::Update {
                id: desc_id,
                fields,
                objectives,
            } => {
                if let Some(row) = tables.descriptions.get_mut(desc_id) {
                    row.fields = fields.clone();
                }
                for oid in &objectives.delete {
                    tables.objectives.remove(oid);
                }
                if let Some(order) = tables.objectives_of.get_mut(desc_id) {
                    order.retain(|oid| !objectives.delete.contains(oid));
                }
                for objective in &objectives.update {
                    if let Some(row) = tables.objectives.get_mut(&objective.id) {
                        row.text = objective.text.clone();
                    }
                }
                for text in &objectives.insert {
                    tables.insert_objective(*desc_id, text);
                }
            }
        }
        Ok(())
    }

    async fn delete_project(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.tables.write().await.remove_project(id))
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn list_comments(&self, project_id: DbId) -> Result<Vec<Comment>, CoreError> {
        Ok(self.tables.read().await.comments_for(project_id))
    }

    async fn insert_comment(&self, input: &NewComment) -> Result<Comment, CoreError> {
        let mut tables = self.tables.write().await;
        if !tables.projects.contains_key(&input.project_id) {
            return Err(CoreError::InvalidReference {
                entity: ENTITY_PROJECT,
                id: input.project_id,
            });
        }
        let comment = Comment {
            id: next(&mut tables.seq.comment),
            content: input.content.clone(),
            author_name: input.author_name.clone(),
            project_id: input.project_id,
            created_at: Utc::now(),
        };
        tables.comments.insert(comment.id, comment.clone());
        tables
            .comments_of
            .entry(input.project_id)
            .or_default()
            .push(comment.id);
        Ok(comment)
    }

    async fn delete_comment(&self, id: DbId) -> Result<bool, CoreError> {
        let mut tables = self.tables.write().await;
        let Some(comment) = tables.comments.remove(&id) else {
            return Ok(false);
        };
        if let Some(ids) = tables.comments_of.get_mut(&comment.project_id) {
            ids.retain(|cid| *cid != id);
        }
        Ok(true)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn append_message(&self, input: &NewMessage) -> Result<Message, CoreError> {
        let mut tables = self.tables.write().await;
        // Keep sent_at monotonic in append order, like a commit clock.
        let now = Utc::now();
        let sent_at = match tables.messages.last() {
            Some(last) if last.sent_at > now => last.sent_at,
            _ => now,
        };
        let message = Message {
            id: next(&mut tables.seq.message),
            content: input.content.clone(),
            sender_name: input.sender_name.clone(),
            sent_at,
        };
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn recent_messages(&self, limit: i64) -> Result<Vec<Message>, CoreError> {
        let limit = usize::try_from(limit).unwrap_or_default();
        let tables = self.tables.read().await;
        let mut messages = tables.messages.clone();
        messages.sort_by(|a, b| b.sent_at.cmp(&a.sent_at).then(b.id.cmp(&a.id)));
        messages.truncate(limit);
        Ok(messages)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
