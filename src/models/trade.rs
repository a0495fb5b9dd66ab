use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Direction, Outcome};

/// A resolved settlement, kept in the session's in-memory history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub direction: Direction,
    pub outcome: Outcome,
    /// `+stake * payout_ratio` on a win, `-stake` on a loss.
    pub payout_delta: Decimal,
    pub pair: String,
    pub resolved_at: DateTime<Utc>,
}

/// Document written to the `trades` collection after a settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTradeRecord {
    pub user_id: String,
    pub direction: String,
    pub result: String,
    /// Signed payout delta, rounded to 2 dp.
    pub amount: Decimal,
    pub pair: String,
    pub traded_at: DateTime<Utc>,
}

impl NewTradeRecord {
    pub fn from_result(user_id: &str, result: &TradeResult) -> Self {
        Self {
            user_id: user_id.to_string(),
            direction: result.direction.to_string(),
            result: result.outcome.to_string(),
            amount: result.payout_delta.round_dp(2),
            pair: result.pair.clone(),
            traded_at: result.resolved_at,
        }
    }
}

/// Database row for trades table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeRecord {
    pub id: Uuid,
    pub user_id: String,
    pub direction: String,
    pub result: String,
    pub amount: Decimal,
    pub pair: String,
    pub traded_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}
