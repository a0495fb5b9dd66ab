use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::models::TradeRecord;
use crate::AppState;

use super::ApiResponse;

const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    pub user_id: String,
    pub limit: Option<i64>,
}

/// GET /api/trades?user_id=: Persisted trade records, newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<TradesQuery>,
) -> Json<ApiResponse<Vec<TradeRecord>>> {
    let limit = q.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 500);

    match state.store.list_trades(&q.user_id, limit).await {
        Ok(trades) => Json(ApiResponse::ok(trades)),
        Err(e) => Json(ApiResponse {
            success: false,
            data: None,
            error: Some(e.to_string()),
        }),
    }
}
