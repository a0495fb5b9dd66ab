use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::engine::{SessionProfile, SettlementSession, SettlementSnapshot};
use crate::errors::AppError;
use crate::models::{Direction, User};
use crate::services::identity::{IdentityProvider, SessionIdentity};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// "dashboard" (default) or "trading".
    pub profile: Option<String>,
    pub user_id: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenTradeRequest {
    pub direction: String,
}

#[derive(Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub snapshot: SettlementSnapshot,
}

impl SessionView {
    fn from_session(session: &SettlementSession) -> Self {
        Self {
            id: session.id(),
            user_id: session.identity().current_user().map(|u| u.id),
            snapshot: session.snapshot(),
        }
    }
}

pub(crate) async fn find_session(
    state: &AppState,
    id: &Uuid,
) -> Result<Arc<SettlementSession>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {id}")))
}

/// POST /api/sessions: Mount a new settlement view.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let profile = req
        .profile
        .as_deref()
        .map(SessionProfile::from_api_str)
        .unwrap_or_default();

    let identity = match req.user_id.filter(|id| !id.is_empty()) {
        Some(user_id) => SessionIdentity::signed_in(User::new(user_id, req.email.unwrap_or_default())),
        None => SessionIdentity::anonymous(),
    };
    let identity: Arc<dyn IdentityProvider> = Arc::new(identity);

    let session = state.sessions.create(profile, identity).await;
    (StatusCode::CREATED, Json(SessionView::from_session(&session)))
}

/// GET /api/sessions/:id: Current snapshot.
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&state, &id).await?;
    Ok(Json(SessionView::from_session(&session)))
}

/// POST /api/sessions/:id/trades: Open a trade. Always 202: an intent that
/// arrives while another trade is settling is dropped, not rejected.
pub async fn open_trade(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<OpenTradeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let direction = Direction::from_api_str(&req.direction)
        .ok_or_else(|| AppError::BadRequest(format!("unknown direction: {}", req.direction)))?;

    let session = find_session(&state, &id).await?;
    let accepted = session.open_trade(direction);

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "accepted": accepted,
            "seconds_remaining": session.snapshot().seconds_remaining,
        })),
    ))
}

/// DELETE /api/sessions/:id: Unmount the view; a pending countdown is dropped.
pub async fn teardown(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !state.sessions.remove(&id).await {
        return Err(AppError::NotFound(format!("session {id}")));
    }
    Ok((StatusCode::OK, Json(json!({ "status": "closed" }))))
}
