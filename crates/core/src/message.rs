//! Chat messages.

use serde::{Deserialize, Serialize};

use crate::comment::{validate_name, validate_text};
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum length of a chat message in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: DbId,
    pub content: String,
    pub sender_name: String,
    /// Set by the store on append; never modified.
    pub sent_at: Timestamp,
}

/// DTO for posting a chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub content: String,
}

impl NewMessage {
    pub fn new(sender_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
            content: content.into(),
        }
    }
}

pub fn validate_new_message(input: &NewMessage) -> Result<(), CoreError> {
    validate_name("Sender name", &input.sender_name)?;
    validate_text("Message content", &input.content, MAX_MESSAGE_LENGTH)
}
