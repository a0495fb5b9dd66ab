use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::RecipientList;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub title: String,
    pub content: String,
    #[serde(rename = "for")]
    pub recipients: Option<RecipientList>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

/// POST /api/messages: Send an admin message to users or "all".
pub async fn send(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let recipients = req
        .recipients
        .ok_or_else(|| AppError::BadRequest("recipients are required".into()))?;

    let id = state
        .messages
        .send_admin_message(&req.title, &req.content, recipients)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// GET /api/messages?user_id=: Messages for a user, newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<impl IntoResponse, AppError> {
    let messages = state.messages.messages_for(&q.user_id).await?;
    let unread = messages.iter().filter(|m| !m.read).count();
    Ok(Json(json!({ "messages": messages, "unread_count": unread })))
}

/// POST /api/messages/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.messages.mark_read(id).await?;
    Ok(Json(json!({ "status": "read" })))
}

/// POST /api/messages/read-all?user_id=
pub async fn mark_all_read(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.messages.mark_all_read(&q.user_id).await?;
    Ok(Json(json!({ "updated": updated })))
}
