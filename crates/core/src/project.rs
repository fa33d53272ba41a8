//! Project aggregate types, desired-state payloads, and validation.
//!
//! A [`Project`] owns at most one [`ProjectDescription`], which owns an
//! ordered list of [`Objective`]s. Comments hang off a project as well but
//! follow their own lifecycle (see [`crate::comment`]).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::comment::Comment;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a project title in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Entity labels used in error messages.
pub const ENTITY_PROJECT: &str = "Project";
pub const ENTITY_DESCRIPTION: &str = "ProjectDescription";

// ---------------------------------------------------------------------------
// Stored aggregate
// ---------------------------------------------------------------------------

/// Scalar columns of a project. Replaced wholesale on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectFields {
    pub title: String,
    /// Free-text summary shown on the project card.
    pub description: String,
    /// Ordered technology tags. Order is preserved through storage.
    pub technologies: Vec<String>,
    pub role: String,
    /// Dashboard image URL.
    pub dash: String,
    /// Thumbnail image URL.
    pub thumbnail: String,
    pub release_status: String,
    pub maintain_status: String,
    /// Display date, kept as the string the author typed.
    pub date: String,
}

/// Scalar columns of a project description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionFields {
    pub title: String,
    pub summary: String,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: DbId,
    pub text: String,
}

/// The long-form description of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescription {
    pub id: DbId,
    #[serde(flatten)]
    pub fields: DescriptionFields,
    /// Objectives in insertion order.
    pub objectives: Vec<Objective>,
}

/// A fully hydrated project aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    #[serde(flatten)]
    pub fields: ProjectFields,
    pub desc: Option<ProjectDescription>,
    /// Visitor comments, newest first. Never touched by reconciliation.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Optimistic concurrency token. Starts at 1, bumped on every update.
    pub version: i32,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Desired-state payloads
// ---------------------------------------------------------------------------

/// An objective as sent by a client.
///
/// `id` is `None` (or `0`) for newly authored objectives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveInput {
    #[serde(default)]
    pub id: Option<DbId>,
    #[serde(default)]
    pub text: String,
}

impl ObjectiveInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
        }
    }

    pub fn with_id(id: DbId, text: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            text: text.into(),
        }
    }

    /// The id if it refers to a stored row, `None` when unassigned.
    pub fn assigned_id(&self) -> Option<DbId> {
        assigned(self.id)
    }
}

/// A project description as sent by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionInput {
    #[serde(default)]
    pub id: Option<DbId>,
    #[serde(flatten)]
    pub fields: DescriptionFields,
    #[serde(default)]
    pub objectives: Vec<ObjectiveInput>,
}

/// Full desired state of a project, used both for create and update.
///
/// On create every id in the payload is ignored. On update, `id` (when
/// present) must match the target project and `version` (when present) must
/// match the stored version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInput {
    #[serde(default)]
    pub id: Option<DbId>,
    #[serde(flatten)]
    pub fields: ProjectFields,
    #[serde(default)]
    pub desc: Option<DescriptionInput>,
    #[serde(default)]
    pub version: Option<i32>,
}

impl ProjectInput {
    /// Build a payload that mirrors a stored aggregate, ids included.
    pub fn from_project(project: &Project) -> Self {
        Self {
            id: Some(project.id),
            fields: project.fields.clone(),
            desc: project.desc.as_ref().map(|desc| DescriptionInput {
                id: Some(desc.id),
                fields: desc.fields.clone(),
                objectives: desc
                    .objectives
                    .iter()
                    .map(|o| ObjectiveInput::with_id(o.id, o.text.clone()))
                    .collect(),
            }),
            version: Some(project.version),
        }
    }
}

/// Treat zero and negative ids as "not assigned by the store".
pub fn assigned(id: Option<DbId>) -> Option<DbId> {
    id.filter(|&id| id > 0)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a desired-state payload before it reaches the store.
pub fn validate_project_input(input: &ProjectInput) -> Result<(), CoreError> {
    validate_title(&input.fields.title)?;

    if let Some(desc) = &input.desc {
        let mut seen = HashSet::new();
        for objective in &desc.objectives {
            if objective.text.trim().is_empty() {
                return Err(CoreError::Validation(
                    "Objective text must not be empty".to_string(),
                ));
            }
            if let Some(id) = objective.assigned_id() {
                if !seen.insert(id) {
                    return Err(CoreError::Validation(format!(
                        "Objective id {id} appears more than once"
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Validate a project title: non-blank and within length limit.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Project title must not be empty".to_string(),
        ));
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Project title too long: {len} chars (max {MAX_TITLE_LENGTH})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn titled(title: &str) -> ProjectInput {
        ProjectInput {
            fields: ProjectFields {
                title: title.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn validate_accepts_minimal_project() {
        assert!(validate_project_input(&titled("Portfolio")).is_ok());
    }

    #[test]
    fn validate_rejects_blank_title() {
        let err = validate_project_input(&titled("   ")).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn validate_rejects_long_title() {
        let err = validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn validate_rejects_blank_objective() {
        let mut input = titled("P");
        input.desc = Some(DescriptionInput {
            objectives: vec![ObjectiveInput::new("")],
            ..Default::default()
        });
        let err = validate_project_input(&input).unwrap_err();
        assert!(err.to_string().contains("Objective text"));
    }

    #[test]
    fn validate_rejects_duplicate_objective_ids() {
        let mut input = titled("P");
        input.desc = Some(DescriptionInput {
            objectives: vec![
                ObjectiveInput::with_id(4, "a"),
                ObjectiveInput::with_id(4, "b"),
            ],
            ..Default::default()
        });
        let err = validate_project_input(&input).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn unassigned_ids_may_repeat() {
        let mut input = titled("P");
        input.desc = Some(DescriptionInput {
            objectives: vec![
                ObjectiveInput::with_id(0, "a"),
                ObjectiveInput::with_id(0, "b"),
                ObjectiveInput::new("c"),
            ],
            ..Default::default()
        });
        assert!(validate_project_input(&input).is_ok());
    }

    #[test]
    fn input_deserializes_flat_payload_with_defaults() {
        let input: ProjectInput = serde_json::from_value(json!({
            "title": "Site",
            "technologies": ["rust", "axum"],
            "desc": {
                "title": "About",
                "objectives": [{"id": 0, "text": "Ship it"}]
            }
        }))
        .unwrap();

        assert_eq!(input.id, None);
        assert_eq!(input.fields.title, "Site");
        assert_eq!(input.fields.technologies, vec!["rust", "axum"]);
        assert_eq!(input.fields.role, "");
        let desc = input.desc.unwrap();
        assert_eq!(desc.fields.title, "About");
        assert_eq!(desc.fields.footer, "");
        assert_eq!(desc.objectives[0].assigned_id(), None);
    }

    #[test]
    fn project_serializes_flat() {
        let project = Project {
            id: 3,
            fields: ProjectFields {
                title: "Site".to_string(),
                ..Default::default()
            },
            desc: None,
            comments: vec![],
            version: 1,
            created_at: chrono::Utc::now(),
        };
        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["title"], "Site");
        assert!(value["desc"].is_null());
        assert!(value.get("fields").is_none());
    }
}
