use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::ChatMessage;
use crate::AppState;

use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct SendChatRequest {
    pub text: String,
}

/// POST /api/chat/:user_id: Post a message to the user's support thread.
pub async fn send(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<SendChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let message = state.chat.send_user_message(&user_id, &req.text).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message))))
}

/// GET /api/chat/:user_id: The thread, oldest first.
pub async fn thread(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, AppError> {
    let messages = state.chat.thread(&user_id).await?;
    Ok(Json(ApiResponse::ok(messages)))
}
