use std::sync::Arc;

use metrics::counter;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::message::ALL_RECIPIENTS;
use crate::models::{AdminMessage, RecipientList};
use crate::store::{DocumentStore, StoreError};

const FEED_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("title and content are required")]
    MissingContent,

    #[error("recipients are required")]
    MissingRecipients,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Admin messages: write to the store, fan out to live subscribers.
pub struct MessageService {
    store: Arc<dyn DocumentStore>,
    feed: broadcast::Sender<AdminMessage>,
}

impl MessageService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self { store, feed }
    }

    /// Send a message to one or more users, or to "all". Returns the new id.
    pub async fn send_admin_message(
        &self,
        title: &str,
        content: &str,
        recipients: RecipientList,
    ) -> Result<Uuid, MessageError> {
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(MessageError::MissingContent);
        }

        let recipients: Vec<String> = recipients
            .into_vec()
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if recipients.is_empty() {
            return Err(MessageError::MissingRecipients);
        }

        let message = self
            .store
            .insert_message(title, content, &recipients)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to store admin message"))?;

        counter!("admin_messages_sent_total").increment(1);
        tracing::info!(
            id = %message.id,
            recipients = recipients.len(),
            "Admin message sent"
        );

        // No live subscribers is fine
        let _ = self.feed.send(message.clone());
        Ok(message.id)
    }

    pub async fn send_global_message(&self, title: &str, content: &str) -> Result<Uuid, MessageError> {
        self.send_admin_message(title, content, RecipientList::One(ALL_RECIPIENTS.into()))
            .await
    }

    pub async fn send_targeted_message(
        &self,
        title: &str,
        content: &str,
        user_ids: Vec<String>,
    ) -> Result<Uuid, MessageError> {
        self.send_admin_message(title, content, RecipientList::Many(user_ids))
            .await
    }

    pub async fn messages_for(&self, user_id: &str) -> Result<Vec<AdminMessage>, MessageError> {
        Ok(self.store.messages_for(user_id).await?)
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<(), MessageError> {
        Ok(self.store.mark_message_read(id).await?)
    }

    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64, MessageError> {
        Ok(self.store.mark_all_messages_read(user_id).await?)
    }

    /// Live feed of messages addressed to `user_id` (directly or via "all").
    pub fn subscribe(&self, user_id: &str) -> FeedSubscription {
        FeedSubscription {
            user_id: user_id.to_string(),
            rx: Some(self.feed.subscribe()),
        }
    }
}

/// Handle to a live message feed. Stops on `cancel()` or drop.
pub struct FeedSubscription {
    user_id: String,
    rx: Option<broadcast::Receiver<AdminMessage>>,
}

impl FeedSubscription {
    /// Next message for this user. `None` once cancelled or the service is gone.
    pub async fn next(&mut self) -> Option<AdminMessage> {
        loop {
            let rx = self.rx.as_mut()?;
            match rx.recv().await {
                Ok(message) if message.is_for(&self.user_id) => return Some(message),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(user_id = %self.user_id, skipped = n, "Message feed lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.rx = None;
                    return None;
                }
            }
        }
    }

    pub fn cancel(&mut self) {
        self.rx = None;
    }

    pub fn is_active(&self) -> bool {
        self.rx.is_some()
    }
}
