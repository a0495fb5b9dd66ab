use std::sync::Arc;
use std::time::Duration;

use metrics::counter;

use crate::models::ChatMessage;
use crate::store::{DocumentStore, StoreError};

/// Delay before an automatic support reply is posted.
pub const BOT_REPLY_DELAY: Duration = Duration::from_secs(1);

struct FaqEntry {
    keywords: &'static [&'static str],
    reply: &'static str,
}

/// Checked in order; the first entry with a matching keyword answers.
const FAQ: &[FaqEntry] = &[
    FaqEntry {
        keywords: &["join", "contest", "tournament"],
        reply: "To join a contest, go to the Trading page and select a tournament from the \
                available options. You can participate in daily and weekly competitions with \
                real prizes!",
    },
    FaqEntry {
        keywords: &["reset", "password", "forgot"],
        reply: "To reset your password, click on 'Forgot Password?' on the login screen. \
                You'll receive an email with instructions to set a new password.",
    },
    FaqEntry {
        keywords: &["rewards", "prizes", "win"],
        reply: "Top traders win USDT, points, and VIP access in every contest. The rewards \
                are distributed based on your ranking and performance.",
    },
    FaqEntry {
        keywords: &["help", "support", "contact"],
        reply: "Our support team is available 24/7. You can reach us through this chat or \
                email us at support@tradox.com",
    },
    FaqEntry {
        keywords: &["trading", "trade", "how to"],
        reply: "To start trading, go to the Trading page, select your preferred trading \
                pair, set your position size, and click Buy or Sell. Remember to use \
                stop-loss orders to manage risk.",
    },
];

/// Canned reply for a user message, matched by case-insensitive substring.
pub fn faq_reply(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    FAQ.iter()
        .find(|faq| faq.keywords.iter().any(|k| lower.contains(k)))
        .map(|faq| faq.reply)
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message text is required")]
    EmptyMessage,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Per-user support chat with keyword-triggered automatic replies.
pub struct ChatService {
    store: Arc<dyn DocumentStore>,
    reply_delay: Duration,
}

impl ChatService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            reply_delay: BOT_REPLY_DELAY,
        }
    }

    /// Store the user's message. If it matches an FAQ keyword, a reply is
    /// posted to the same thread after the reply delay. The reply write is
    /// fire-and-forget: a failure is logged and the user's message stands.
    pub async fn send_user_message(
        &self,
        user_id: &str,
        text: &str,
    ) -> Result<ChatMessage, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let message = self
            .store
            .insert_chat_message(user_id, text, true)
            .await
            .inspect_err(|e| tracing::error!(user_id, error = %e, "Failed to store chat message"))?;
        counter!("chat_messages_total", "from" => "user").increment(1);

        if let Some(reply) = faq_reply(text) {
            let store = Arc::clone(&self.store);
            let user_id = user_id.to_string();
            let delay = self.reply_delay;

            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                match store.insert_chat_message(&user_id, reply, false).await {
                    Ok(_) => {
                        counter!("chat_messages_total", "from" => "bot").increment(1);
                        tracing::debug!(user_id = %user_id, "Support reply posted");
                    }
                    Err(e) => {
                        tracing::error!(user_id = %user_id, error = %e, "Failed to post support reply");
                    }
                }
            });
        }

        Ok(message)
    }

    /// The user's thread, oldest first.
    pub async fn thread(&self, user_id: &str) -> Result<Vec<ChatMessage>, ChatError> {
        Ok(self.store.chat_for(user_id).await?)
    }
}
