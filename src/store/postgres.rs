use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{chat_repo, message_repo, notification_repo, settings_repo, trade_repo};
use crate::models::{
    AdminMessage, ChatMessage, NewTradeRecord, Notification, TradeRecord, UserSettings,
};

use super::{DocumentStore, StoreError};

/// Postgres-backed document store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn require_row(rows: u64, what: String) -> Result<(), StoreError> {
    if rows == 0 {
        Err(StoreError::NotFound(what))
    } else {
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn insert_trade(&self, record: &NewTradeRecord) -> Result<TradeRecord, StoreError> {
        Ok(trade_repo::insert_trade(&self.pool, record).await?)
    }

    async fn list_trades(&self, user_id: &str, limit: i64) -> Result<Vec<TradeRecord>, StoreError> {
        Ok(trade_repo::get_recent_trades(&self.pool, user_id, limit).await?)
    }

    async fn insert_message(
        &self,
        title: &str,
        content: &str,
        recipients: &[String],
    ) -> Result<AdminMessage, StoreError> {
        Ok(message_repo::insert_message(&self.pool, title, content, recipients).await?)
    }

    async fn messages_for(&self, user_id: &str) -> Result<Vec<AdminMessage>, StoreError> {
        Ok(message_repo::get_messages_for(&self.pool, user_id).await?)
    }

    async fn mark_message_read(&self, id: Uuid) -> Result<(), StoreError> {
        let rows = message_repo::mark_read(&self.pool, id).await?;
        require_row(rows, format!("message {id}"))
    }

    async fn mark_all_messages_read(&self, user_id: &str) -> Result<u64, StoreError> {
        Ok(message_repo::mark_all_read(&self.pool, user_id).await?)
    }

    async fn insert_notification(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Notification, StoreError> {
        Ok(notification_repo::insert_notification(&self.pool, user_id, title, body).await?)
    }

    async fn notifications_for(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<Notification>, StoreError> {
        Ok(notification_repo::get_recent(&self.pool, user_id, limit).await?)
    }

    async fn mark_notification_read(&self, user_id: &str, id: Uuid) -> Result<(), StoreError> {
        let rows = notification_repo::mark_read(&self.pool, user_id, id).await?;
        require_row(rows, format!("notification {id}"))
    }

    async fn mark_all_notifications_read(&self, user_id: &str) -> Result<u64, StoreError> {
        Ok(notification_repo::mark_all_read(&self.pool, user_id).await?)
    }

    async fn insert_chat_message(
        &self,
        user_id: &str,
        text: &str,
        is_user: bool,
    ) -> Result<ChatMessage, StoreError> {
        Ok(chat_repo::insert_chat_message(&self.pool, user_id, text, is_user).await?)
    }

    async fn chat_for(&self, user_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(chat_repo::get_thread(&self.pool, user_id).await?)
    }

    async fn get_settings(&self, user_id: &str) -> Result<Option<UserSettings>, StoreError> {
        Ok(settings_repo::get_settings(&self.pool, user_id).await?)
    }

    async fn put_settings(&self, user_id: &str, settings: &UserSettings) -> Result<(), StoreError> {
        Ok(settings_repo::upsert_settings(&self.pool, user_id, settings).await?)
    }
}
