//! View preference handlers.

use axum::{extract::State, Json};
use tracing::debug;

use crate::{ApiError, AppState, RequireAuth};
use brain_core::Settings;

#[utoipa::path(get, path = "/api/v1/settings", tag = "Settings",
    responses((status = 200, description = "Success", body = Settings)))]
pub async fn get_settings(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<Settings>, ApiError> {
    Ok(Json(state.settings.load(auth.user_id).await?))
}

#[utoipa::path(put, path = "/api/v1/settings", tag = "Settings",
    request_body = Settings,
    responses((status = 200, description = "Saved", body = Settings)))]
pub async fn put_settings(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, ApiError> {
    state.settings.save(auth.user_id, &settings).await?;
    debug!(
        subsystem = "api",
        component = "settings",
        op = "save",
        user_id = %auth.user_id,
        view_mode = ?settings.view_mode,
        "Settings saved"
    );
    Ok(Json(settings))
}
