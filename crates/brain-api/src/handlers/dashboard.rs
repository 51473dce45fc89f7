//! Dashboard counters.

use axum::{extract::State, Json};

use crate::{ApiError, AppState, RequireAuth};
use brain_core::DashboardStats;

#[utoipa::path(get, path = "/api/v1/dashboard", tag = "Dashboard",
    responses((status = 200, description = "Success", body = DashboardStats)))]
pub async fn dashboard(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<DashboardStats>, ApiError> {
    let cards = state.cards.list(auth.user_id).await?;
    let topics = state.topics.list(auth.user_id).await?;
    Ok(Json(DashboardStats::compute(&cards, &topics)))
}
