pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    AdminMessage, ChatMessage, NewTradeRecord, Notification, TradeRecord, UserSettings,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Append-only trade write used by settlement sessions.
#[async_trait]
pub trait TradeRecorder: Send + Sync {
    async fn record_trade(&self, record: &NewTradeRecord) -> Result<(), StoreError>;
}

/// Multi-collection document store: trades, messages, notifications,
/// support chat and per-user settings.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    // --- trades ---
    async fn insert_trade(&self, record: &NewTradeRecord) -> Result<TradeRecord, StoreError>;
    async fn list_trades(&self, user_id: &str, limit: i64) -> Result<Vec<TradeRecord>, StoreError>;

    // --- admin messages ---
    async fn insert_message(
        &self,
        title: &str,
        content: &str,
        recipients: &[String],
    ) -> Result<AdminMessage, StoreError>;
    /// Messages addressed to `user_id` or to everyone, newest first.
    async fn messages_for(&self, user_id: &str) -> Result<Vec<AdminMessage>, StoreError>;
    async fn mark_message_read(&self, id: Uuid) -> Result<(), StoreError>;
    async fn mark_all_messages_read(&self, user_id: &str) -> Result<u64, StoreError>;

    // --- notifications ---
    async fn insert_notification(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Notification, StoreError>;
    async fn notifications_for(&self, user_id: &str, limit: i64)
        -> Result<Vec<Notification>, StoreError>;
    async fn mark_notification_read(&self, user_id: &str, id: Uuid) -> Result<(), StoreError>;
    async fn mark_all_notifications_read(&self, user_id: &str) -> Result<u64, StoreError>;

    // --- support chat ---
    async fn insert_chat_message(
        &self,
        user_id: &str,
        text: &str,
        is_user: bool,
    ) -> Result<ChatMessage, StoreError>;
    /// The user's chat thread, oldest first.
    async fn chat_for(&self, user_id: &str) -> Result<Vec<ChatMessage>, StoreError>;

    // --- settings ---
    async fn get_settings(&self, user_id: &str) -> Result<Option<UserSettings>, StoreError>;
    async fn put_settings(&self, user_id: &str, settings: &UserSettings) -> Result<(), StoreError>;
}

/// Routes settlement trade writes into a document store.
#[derive(Clone)]
pub struct StoreRecorder {
    store: Arc<dyn DocumentStore>,
}

impl StoreRecorder {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TradeRecorder for StoreRecorder {
    async fn record_trade(&self, record: &NewTradeRecord) -> Result<(), StoreError> {
        self.store.insert_trade(record).await.map(|_| ())
    }
}
