use sqlx::PgPool;

use crate::models::ChatMessage;

pub async fn insert_chat_message(
    pool: &PgPool,
    user_id: &str,
    text: &str,
    is_user: bool,
) -> anyhow::Result<ChatMessage> {
    let message = sqlx::query_as::<_, ChatMessage>(
        r#"
        INSERT INTO chat_messages (user_id, text, is_user)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(text)
    .bind(is_user)
    .fetch_one(pool)
    .await?;

    Ok(message)
}

/// Full thread for a user, oldest first.
pub async fn get_thread(pool: &PgPool, user_id: &str) -> anyhow::Result<Vec<ChatMessage>> {
    let messages = sqlx::query_as::<_, ChatMessage>(
        "SELECT * FROM chat_messages WHERE user_id = $1 ORDER BY created_at ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}
