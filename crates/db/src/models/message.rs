//! Rows of the `messages` table.

use portfolio_core::message::Message;
use portfolio_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: DbId,
    pub content: String,
    pub sender_name: String,
    pub sent_at: Timestamp,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            sender_name: row.sender_name,
            sent_at: row.sent_at,
        }
    }
}
