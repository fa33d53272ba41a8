//! Rows of the `projects`, `project_descriptions` and `objectives` tables.

use portfolio_core::comment::Comment;
use portfolio_core::project::{
    DescriptionFields, Objective, Project, ProjectDescription, ProjectFields,
};
use portfolio_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub title: String,
    pub description: String,
    /// JSONB array, order preserved.
    pub technologies: Json<Vec<String>>,
    pub role: String,
    pub dash: String,
    pub thumbnail: String,
    pub release_status: String,
    pub maintain_status: String,
    pub date: String,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectRow {
    pub fn fields(&self) -> ProjectFields {
        ProjectFields {
            title: self.title.clone(),
            description: self.description.clone(),
            technologies: self.technologies.0.clone(),
            role: self.role.clone(),
            dash: self.dash.clone(),
            thumbnail: self.thumbnail.clone(),
            release_status: self.release_status.clone(),
            maintain_status: self.maintain_status.clone(),
            date: self.date.clone(),
        }
    }

    /// Assemble the domain aggregate from this row and its children.
    pub fn into_project(
        self,
        desc: Option<ProjectDescription>,
        comments: Vec<Comment>,
    ) -> Project {
        Project {
            id: self.id,
            fields: self.fields(),
            desc,
            comments,
            version: self.version,
            created_at: self.created_at,
        }
    }
}

/// A row from the `project_descriptions` table.
#[derive(Debug, Clone, FromRow)]
pub struct DescriptionRow {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub summary: String,
    pub footer: String,
}

impl DescriptionRow {
    pub fn into_description(self, objectives: Vec<ObjectiveRow>) -> ProjectDescription {
        ProjectDescription {
            id: self.id,
            fields: DescriptionFields {
                title: self.title,
                summary: self.summary,
                footer: self.footer,
            },
            objectives: objectives.into_iter().map(Objective::from).collect(),
        }
    }
}

/// A row from the `objectives` table.
#[derive(Debug, Clone, FromRow)]
pub struct ObjectiveRow {
    pub id: DbId,
    pub description_id: DbId,
    pub text: String,
}

impl From<ObjectiveRow> for Objective {
    fn from(row: ObjectiveRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ProjectRow {
        ProjectRow {
            id: 7,
            title: "Site".to_string(),
            description: "desc".to_string(),
            technologies: Json(vec!["rust".to_string(), "sql".to_string()]),
            role: "Dev".to_string(),
            dash: String::new(),
            thumbnail: String::new(),
            release_status: "released".to_string(),
            maintain_status: String::new(),
            date: "2024".to_string(),
            version: 3,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn into_project_keeps_technology_order() {
        let project = row().into_project(None, vec![]);
        assert_eq!(project.id, 7);
        assert_eq!(project.version, 3);
        assert_eq!(project.fields.technologies, vec!["rust", "sql"]);
        assert_eq!(project.fields.release_status, "released");
    }

    #[test]
    fn into_description_maps_objectives_in_order() {
        let desc = DescriptionRow {
            id: 2,
            project_id: 7,
            title: "About".to_string(),
            summary: String::new(),
            footer: "fin".to_string(),
        }
        .into_description(vec![
            ObjectiveRow {
                id: 5,
                description_id: 2,
                text: "one".to_string(),
            },
            ObjectiveRow {
                id: 9,
                description_id: 2,
                text: "two".to_string(),
            },
        ]);
        assert_eq!(desc.fields.footer, "fin");
        let ids: Vec<DbId> = desc.objectives.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![5, 9]);
    }
}
