use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    AdminMessage, ChatMessage, NewTradeRecord, Notification, TradeRecord, UserSettings,
};

use super::{DocumentStore, StoreError};

#[derive(Default)]
struct Collections {
    trades: Vec<TradeRecord>,
    messages: Vec<AdminMessage>,
    notifications: Vec<Notification>,
    chat: Vec<ChatMessage>,
    settings: HashMap<String, UserSettings>,
}

/// Process-local document store. Used when no database is configured and
/// in tests. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn trade_count(&self) -> usize {
        self.inner.read().await.trades.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_trade(&self, record: &NewTradeRecord) -> Result<TradeRecord, StoreError> {
        let row = TradeRecord {
            id: Uuid::new_v4(),
            user_id: record.user_id.clone(),
            direction: record.direction.clone(),
            result: record.result.clone(),
            amount: record.amount,
            pair: record.pair.clone(),
            traded_at: record.traded_at,
            created_at: Some(Utc::now()),
        };
        self.inner.write().await.trades.push(row.clone());
        Ok(row)
    }

    async fn list_trades(&self, user_id: &str, limit: i64) -> Result<Vec<TradeRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut trades: Vec<TradeRecord> = inner
            .trades
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        trades.sort_by(|a, b| b.traded_at.cmp(&a.traded_at));
        trades.truncate(limit.max(0) as usize);
        Ok(trades)
    }

    async fn insert_message(
        &self,
        title: &str,
        content: &str,
        recipients: &[String],
    ) -> Result<AdminMessage, StoreError> {
        let message = AdminMessage {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            recipients: recipients.to_vec(),
            kind: "admin".into(),
            read: false,
            created_at: Utc::now(),
        };
        self.inner.write().await.messages.push(message.clone());
        Ok(message)
    }

    async fn messages_for(&self, user_id: &str) -> Result<Vec<AdminMessage>, StoreError> {
        let inner = self.inner.read().await;
        let mut messages: Vec<AdminMessage> = inner
            .messages
            .iter()
            .filter(|m| m.is_for(user_id))
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    async fn mark_message_read(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let message = inner
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("message {id}")))?;
        message.read = true;
        Ok(())
    }

    async fn mark_all_messages_read(&self, user_id: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let mut updated = 0;
        for message in inner
            .messages
            .iter_mut()
            .filter(|m| !m.read && m.is_for(user_id))
        {
            message.read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn insert_notification(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Notification, StoreError> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            read: false,
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(notification)
    }

    async fn notifications_for(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<Notification>, StoreError> {
        let inner = self.inner.read().await;
        let mut notifications: Vec<Notification> = inner
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications.truncate(limit.max(0) as usize);
        Ok(notifications)
    }

    async fn mark_notification_read(&self, user_id: &str, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let notification = inner
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .ok_or_else(|| StoreError::NotFound(format!("notification {id}")))?;
        notification.read = true;
        Ok(())
    }

    async fn mark_all_notifications_read(&self, user_id: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let mut updated = 0;
        for notification in inner
            .notifications
            .iter_mut()
            .filter(|n| !n.read && n.user_id == user_id)
        {
            notification.read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn insert_chat_message(
        &self,
        user_id: &str,
        text: &str,
        is_user: bool,
    ) -> Result<ChatMessage, StoreError> {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            text: text.to_string(),
            is_user,
            created_at: Utc::now(),
        };
        self.inner.write().await.chat.push(message.clone());
        Ok(message)
    }

    // Insertion order is chronological order.
    async fn chat_for(&self, user_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .chat
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_settings(&self, user_id: &str) -> Result<Option<UserSettings>, StoreError> {
        Ok(self.inner.read().await.settings.get(user_id).cloned())
    }

    async fn put_settings(&self, user_id: &str, settings: &UserSettings) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .settings
            .insert(user_id.to_string(), settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn record(user_id: &str) -> NewTradeRecord {
        NewTradeRecord {
            user_id: user_id.into(),
            direction: "up".into(),
            result: "win".into(),
            amount: Decimal::new(400, 2),
            pair: "BTCUSDT".into(),
            traded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_trades_are_scoped_to_user() {
        let store = MemoryStore::new();
        store.insert_trade(&record("a")).await.unwrap();
        store.insert_trade(&record("a")).await.unwrap();
        store.insert_trade(&record("b")).await.unwrap();

        assert_eq!(store.list_trades("a", 50).await.unwrap().len(), 2);
        assert_eq!(store.list_trades("a", 1).await.unwrap().len(), 1);
        assert_eq!(store.trade_count().await, 3);
    }

    #[tokio::test]
    async fn test_mark_all_messages_read_only_touches_addressed() {
        let store = MemoryStore::new();
        store.insert_message("t", "c", &["u1".into()]).await.unwrap();
        store.insert_message("t", "c", &["all".into()]).await.unwrap();
        let other = store.insert_message("t", "c", &["u2".into()]).await.unwrap();

        assert_eq!(store.mark_all_messages_read("u1").await.unwrap(), 2);

        let for_u2 = store.messages_for("u2").await.unwrap();
        let untouched = for_u2.iter().find(|m| m.id == other.id).unwrap();
        assert!(!untouched.read);
    }

    #[tokio::test]
    async fn test_chat_thread_is_per_user_and_oldest_first() {
        let store = MemoryStore::new();
        store.insert_chat_message("u1", "first", true).await.unwrap();
        store.insert_chat_message("u2", "other", true).await.unwrap();
        store.insert_chat_message("u1", "reply", false).await.unwrap();

        let thread = store.chat_for("u1").await.unwrap();
        let texts: Vec<_> = thread.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["first", "reply"]);
        assert!(!thread[1].is_user);
    }

    #[tokio::test]
    async fn test_mark_unknown_notification_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .mark_notification_read("u1", Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
