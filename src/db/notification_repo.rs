use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Notification;

pub async fn insert_notification(
    pool: &PgPool,
    user_id: &str,
    title: &str,
    body: &str,
) -> anyhow::Result<Notification> {
    let notification = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (user_id, title, body)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(body)
    .fetch_one(pool)
    .await?;

    Ok(notification)
}

pub async fn get_recent(
    pool: &PgPool,
    user_id: &str,
    limit: i64,
) -> anyhow::Result<Vec<Notification>> {
    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}

pub async fn mark_read(pool: &PgPool, user_id: &str, id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn mark_all_read(pool: &PgPool, user_id: &str) -> anyhow::Result<u64> {
    let result =
        sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE")
            .bind(user_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected())
}
