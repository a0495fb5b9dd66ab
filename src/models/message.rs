use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Recipient marker that addresses a message to every user.
pub const ALL_RECIPIENTS: &str = "all";

/// Database row for messages table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminMessage {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub recipients: Vec<String>,
    pub kind: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl AdminMessage {
    /// True if the message targets `user_id` directly or everyone.
    pub fn is_for(&self, user_id: &str) -> bool {
        self.recipients
            .iter()
            .any(|r| r == user_id || r == ALL_RECIPIENTS)
    }
}

/// Recipients as accepted from callers: one id (or "all") or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipientList {
    One(String),
    Many(Vec<String>),
}

impl RecipientList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            RecipientList::One(r) => vec![r],
            RecipientList::Many(rs) => rs,
        }
    }
}

/// Database row for notifications table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Newest-first notification page plus the unread count.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationFeed {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

impl NotificationFeed {
    pub fn from_notifications(notifications: Vec<Notification>) -> Self {
        let unread_count = notifications.iter().filter(|n| !n.read).count();
        Self {
            notifications,
            unread_count,
        }
    }
}
