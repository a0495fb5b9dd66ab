use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::NotificationFeed;
use crate::AppState;

const FEED_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

/// GET /api/notifications?user_id=: 50 newest plus unread count.
pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<Json<NotificationFeed>, AppError> {
    let notifications = state.store.notifications_for(&q.user_id, FEED_LIMIT).await?;
    Ok(Json(NotificationFeed::from_notifications(notifications)))
}

/// POST /api/notifications/:id/read?user_id=
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.store.mark_notification_read(&q.user_id, id).await?;
    Ok(Json(json!({ "status": "read" })))
}

/// POST /api/notifications/read-all?user_id=
pub async fn mark_all_read(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.store.mark_all_notifications_read(&q.user_id).await?;
    tracing::debug!(user_id = %q.user_id, updated, "Notifications marked read");
    Ok(Json(json!({ "updated": updated })))
}
