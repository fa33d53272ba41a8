//! Desired-state reconciliation for the project aggregate.
//!
//! An update request carries the whole project graph. [`plan`] diffs it
//! against the stored aggregate by id and produces a [`ProjectChanges`]
//! that a [`ProjectStore`] applies in one transaction:
//!
//! - Project scalars are replaced wholesale.
//! - The description is updated in place, created if missing, and left
//!   alone when the payload has none (it is never deleted here).
//! - Objectives are matched by id: unmatched stored rows are deleted,
//!   matched rows get their text overwritten, everything else is inserted.

use std::collections::{HashMap, HashSet};

use crate::error::CoreError;
use crate::project::{
    assigned, validate_project_input, DescriptionFields, Objective, ObjectiveInput, Project,
    ProjectFields, ProjectInput, ENTITY_PROJECT,
};
use crate::store::ProjectStore;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Change set
// ---------------------------------------------------------------------------

/// Row-level objective edits within one description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectiveChanges {
    /// Stored objectives absent from the payload.
    pub delete: Vec<DbId>,
    /// Stored objectives whose text changed. Position is kept.
    pub update: Vec<Objective>,
    /// Texts to append as new rows, in payload order.
    pub insert: Vec<String>,
}

impl ObjectiveChanges {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.update.is_empty() && self.insert.is_empty()
    }
}

/// What happens to the project's description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionChange {
    /// Payload had no description; stored state is untouched.
    Keep,
    /// Both sides have a description.
    Update {
        id: DbId,
        fields: DescriptionFields,
        objectives: ObjectiveChanges,
    },
    /// Only the payload has a description. Objectives are fresh rows.
    Create {
        fields: DescriptionFields,
        objectives: Vec<String>,
    },
}

impl DescriptionChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Update { .. } => "update",
            Self::Create { .. } => "create",
        }
    }
}

/// Everything needed to move one project to its desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectChanges {
    pub project_id: DbId,
    /// The version the plan was computed against.
    pub expected_version: i32,
    pub fields: ProjectFields,
    pub description: DescriptionChange,
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Compute the change set that turns `existing` into `desired`.
pub fn plan(existing: &Project, desired: &ProjectInput) -> Result<ProjectChanges, CoreError> {
    validate_project_input(desired)?;

    if let Some(id) = assigned(desired.id) {
        if id != existing.id {
            return Err(CoreError::Validation(format!(
                "Payload id {id} does not match project {}",
                existing.id
            )));
        }
    }

    if let Some(version) = desired.version {
        if version != existing.version {
            return Err(CoreError::ConcurrencyConflict {
                entity: ENTITY_PROJECT,
                id: existing.id,
            });
        }
    }

    let description = match (&existing.desc, &desired.desc) {
        (Some(current), Some(wanted)) => DescriptionChange::Update {
            id: current.id,
            fields: wanted.fields.clone(),
            objectives: diff_objectives(&current.objectives, &wanted.objectives),
        },
        (None, Some(wanted)) => DescriptionChange::Create {
            fields: wanted.fields.clone(),
            objectives: wanted.objectives.iter().map(|o| o.text.clone()).collect(),
        },
        (_, None) => DescriptionChange::Keep,
    };

    Ok(ProjectChanges {
        project_id: existing.id,
        expected_version: existing.version,
        fields: desired.fields.clone(),
        description,
    })
}

/// Three-way diff of objectives keyed by id.
pub fn diff_objectives(existing: &[Objective], desired: &[ObjectiveInput]) -> ObjectiveChanges {
    let wanted: HashSet<DbId> = desired
        .iter()
        .filter_map(ObjectiveInput::assigned_id)
        .collect();
    let stored: HashMap<DbId, &Objective> = existing.iter().map(|o| (o.id, o)).collect();

    let delete = existing
        .iter()
        .filter(|o| !wanted.contains(&o.id))
        .map(|o| o.id)
        .collect();

    let mut update = Vec::new();
    let mut insert = Vec::new();
    for objective in desired {
        match objective.assigned_id().and_then(|id| stored.get(&id)) {
            Some(current) => {
                if current.text != objective.text {
                    update.push(Objective {
                        id: current.id,
                        text: objective.text.clone(),
                    });
                }
            }
            None => insert.push(objective.text.clone()),
        }
    }

    ObjectiveChanges {
        delete,
        update,
        insert,
    }
}

// ---------------------------------------------------------------------------
// AggregateReconciler
// ---------------------------------------------------------------------------

/// Applies desired-state updates to stored project aggregates.
///
/// Conflicts are reported, never retried or merged.
pub struct AggregateReconciler<'a, S: ProjectStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ProjectStore + ?Sized> AggregateReconciler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Load project `id` and reconcile it against `desired`.
    pub async fn update(&self, id: DbId, desired: &ProjectInput) -> Result<Project, CoreError> {
        let existing = self
            .store
            .get_project(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: ENTITY_PROJECT,
                id,
            })?;
        self.reconcile(&existing, desired).await
    }

    /// Reconcile a previously read aggregate and return the stored result.
    ///
    /// `existing` is the caller's read; if the store has moved on since,
    /// the commit fails with [`CoreError::ConcurrencyConflict`].
    pub async fn reconcile(
        &self,
        existing: &Project,
        desired: &ProjectInput,
    ) -> Result<Project, CoreError> {
        let changes = plan(existing, desired)?;
        self.store.apply_changes(&changes).await?;

        let (deleted, updated, inserted) = match &changes.description {
            DescriptionChange::Update { objectives, .. } => (
                objectives.delete.len(),
                objectives.update.len(),
                objectives.insert.len(),
            ),
            DescriptionChange::Create { objectives, .. } => (0, 0, objectives.len()),
            DescriptionChange::Keep => (0, 0, 0),
        };
        tracing::info!(
            project_id = existing.id,
            version = changes.expected_version + 1,
            description = changes.description.as_str(),
            deleted,
            updated,
            inserted,
            "Project reconciled"
        );

        self.store
            .get_project(existing.id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: ENTITY_PROJECT,
                id: existing.id,
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
