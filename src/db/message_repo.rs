use sqlx::PgPool;
use uuid::Uuid;

use crate::models::AdminMessage;

pub async fn insert_message(
    pool: &PgPool,
    title: &str,
    content: &str,
    recipients: &[String],
) -> anyhow::Result<AdminMessage> {
    let message = sqlx::query_as::<_, AdminMessage>(
        r#"
        INSERT INTO messages (title, content, recipients, kind)
        VALUES ($1, $2, $3, 'admin')
        RETURNING *
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(recipients)
    .fetch_one(pool)
    .await?;

    Ok(message)
}

/// Messages whose recipients contain the user or "all", newest first.
pub async fn get_messages_for(pool: &PgPool, user_id: &str) -> anyhow::Result<Vec<AdminMessage>> {
    let messages = sqlx::query_as::<_, AdminMessage>(
        r#"
        SELECT * FROM messages
        WHERE recipients && ARRAY[$1, 'all']::text[]
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Returns the number of rows updated (0 when the id is unknown).
pub async fn mark_read(pool: &PgPool, id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query("UPDATE messages SET read = TRUE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn mark_all_read(pool: &PgPool, user_id: &str) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE messages SET read = TRUE
        WHERE read = FALSE AND recipients && ARRAY[$1, 'all']::text[]
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
