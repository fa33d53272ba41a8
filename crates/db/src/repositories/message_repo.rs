//! Repository for the `messages` table.

use portfolio_core::message::NewMessage;
use sqlx::PgPool;

use crate::models::message::MessageRow;

const COLUMNS: &str = "id, content, sender_name, sent_at";

pub struct MessageRepo;

impl MessageRepo {
    /// Append a message. `id` and `sent_at` are assigned by the database.
    pub async fn create(pool: &PgPool, input: &NewMessage) -> Result<MessageRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages (content, sender_name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MessageRow>(&query)
            .bind(&input.content)
            .bind(&input.sender_name)
            .fetch_one(pool)
            .await
    }

    /// The `limit` most recent messages, newest first. Equal timestamps
    /// fall back to insertion order, later first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<MessageRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages ORDER BY sent_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, MessageRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
