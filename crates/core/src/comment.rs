//! Visitor comments attached to a project.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum length of comment content in characters.
pub const MAX_COMMENT_LENGTH: usize = 2_000;

/// Maximum length of a display name (comment author, chat sender).
pub const MAX_NAME_LENGTH: usize = 100;

pub const ENTITY_COMMENT: &str = "Comment";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: DbId,
    pub content: String,
    pub author_name: String,
    pub project_id: DbId,
    /// Set by the store on insert.
    pub created_at: Timestamp,
}

/// DTO for creating a comment. Carries no id or timestamp on purpose.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub project_id: DbId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author_name: String,
}

pub fn validate_new_comment(input: &NewComment) -> Result<(), CoreError> {
    validate_name("Author name", &input.author_name)?;
    validate_text("Comment content", &input.content, MAX_COMMENT_LENGTH)
}

/// Validate a display name: non-blank and within [`MAX_NAME_LENGTH`].
pub fn validate_name(label: &str, name: &str) -> Result<(), CoreError> {
    validate_text(label, name, MAX_NAME_LENGTH)
}

/// Validate free text: non-blank and at most `max` characters.
pub fn validate_text(label: &str, text: &str, max: usize) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation(format!("{label} must not be empty")));
    }
    let len = text.chars().count();
    if len > max {
        return Err(CoreError::Validation(format!(
            "{label} too long: {len} chars (max {max})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(author: &str, content: &str) -> NewComment {
        NewComment {
            project_id: 1,
            content: content.to_string(),
            author_name: author.to_string(),
        }
    }

    #[test]
    fn accepts_valid_comment() {
        assert!(validate_new_comment(&comment("Ada", "Nice work")).is_ok());
    }

    #[test]
    fn rejects_missing_author() {
        let err = validate_new_comment(&comment("", "Nice work")).unwrap_err();
        assert!(err.to_string().contains("Author name must not be empty"));
    }

    #[test]
    fn rejects_oversized_content() {
        let err = validate_new_comment(&comment("Ada", &"x".repeat(MAX_COMMENT_LENGTH + 1)))
            .unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn client_supplied_id_is_not_part_of_the_dto() {
        let input: NewComment = serde_json::from_value(serde_json::json!({
            "id": 99,
            "project_id": 1,
            "content": "hi",
            "author_name": "Ada",
            "created_at": "1999-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(input.project_id, 1);
        assert_eq!(input.content, "hi");
    }
}
