use sqlx::PgPool;

use crate::models::{NewTradeRecord, TradeRecord};

/// Insert a settled trade record.
pub async fn insert_trade(pool: &PgPool, record: &NewTradeRecord) -> anyhow::Result<TradeRecord> {
    let trade = sqlx::query_as::<_, TradeRecord>(
        r#"
        INSERT INTO trades (user_id, direction, result, amount, pair, traded_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&record.user_id)
    .bind(&record.direction)
    .bind(&record.result)
    .bind(record.amount)
    .bind(&record.pair)
    .bind(record.traded_at)
    .fetch_one(pool)
    .await?;

    Ok(trade)
}

/// Get the N most recent trades for a user.
pub async fn get_recent_trades(
    pool: &PgPool,
    user_id: &str,
    limit: i64,
) -> anyhow::Result<Vec<TradeRecord>> {
    let trades = sqlx::query_as::<_, TradeRecord>(
        "SELECT * FROM trades WHERE user_id = $1 ORDER BY traded_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(trades)
}
