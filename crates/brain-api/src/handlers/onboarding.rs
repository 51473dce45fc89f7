//! First-run onboarding handlers.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{ApiError, AppState, RequireAuth};
use brain_core::{complete_onboarding, OnboardingTemplate, UserProfile};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CompleteOnboardingRequest {
    /// `blank` or `pastor`.
    pub template: String,
}

/// Onboarding status. Users without a profile have not onboarded yet.
#[utoipa::path(get, path = "/api/v1/onboarding", tag = "Onboarding",
    responses((status = 200, description = "Success", body = UserProfile)))]
pub async fn get_onboarding(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state
        .profiles
        .get(auth.user_id)
        .await?
        .unwrap_or_else(|| UserProfile {
            user_id: auth.user_id,
            ..Default::default()
        });
    Ok(Json(profile))
}

/// Seed the chosen template and mark onboarding complete.
#[utoipa::path(post, path = "/api/v1/onboarding", tag = "Onboarding",
    request_body = CompleteOnboardingRequest,
    responses((status = 200, description = "Completed", body = UserProfile),
              (status = 409, description = "Already onboarded")))]
pub async fn post_onboarding(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<CompleteOnboardingRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    if let Some(profile) = state.profiles.get(auth.user_id).await? {
        if profile.onboarding_complete {
            return Err(ApiError::Conflict("Onboarding is already complete".to_string()));
        }
    }
    let template: OnboardingTemplate = req.template.parse()?;
    let profile = complete_onboarding(
        state.topics.as_ref(),
        state.profiles.as_ref(),
        auth.user_id,
        template,
    )
    .await?;
    Ok(Json(profile))
}
