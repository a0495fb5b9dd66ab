use axum::extract::{Path, State};
use axum::Json;

use crate::errors::AppError;
use crate::models::UserSettings;
use crate::AppState;

/// GET /api/settings/:user_id: Stored preferences, created with defaults
/// on first read.
pub async fn get_settings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserSettings>, AppError> {
    if let Some(settings) = state.store.get_settings(&user_id).await? {
        return Ok(Json(settings));
    }

    let defaults = UserSettings::default();
    state.store.put_settings(&user_id, &defaults).await?;
    tracing::info!(user_id = %user_id, "Default settings created");
    Ok(Json(defaults))
}

/// PUT /api/settings/:user_id
pub async fn update_settings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(settings): Json<UserSettings>,
) -> Result<Json<UserSettings>, AppError> {
    state.store.put_settings(&user_id, &settings).await?;
    tracing::info!(user_id = %user_id, "Settings saved");
    Ok(Json(settings))
}
