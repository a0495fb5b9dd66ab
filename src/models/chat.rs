use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for chat_messages table. One thread per user; `is_user`
/// is false for automatic support replies.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user_id: String,
    pub text: String,
    pub is_user: bool,
    pub created_at: DateTime<Utc>,
}
