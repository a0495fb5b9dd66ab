use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::UserSettings;

pub async fn get_settings(pool: &PgPool, user_id: &str) -> anyhow::Result<Option<UserSettings>> {
    let row: Option<(Json<UserSettings>,)> =
        sqlx::query_as("SELECT preferences FROM user_settings WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(Json(settings),)| settings))
}

pub async fn upsert_settings(
    pool: &PgPool,
    user_id: &str,
    settings: &UserSettings,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_settings (user_id, preferences)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET preferences = $2, updated_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(Json(settings))
    .execute(pool)
    .await?;

    Ok(())
}
