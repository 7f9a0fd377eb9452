//! Profile and onboarding handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use shared::{AccessDecision, AccessState, IndustryType, OnboardingForm, UserProfile, UserRole};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ProfileService;
use crate::AppState;

#[derive(Serialize)]
pub struct OnboardingResponse {
    pub profile: UserProfile,
    pub access: AccessDecision,
}

#[derive(Serialize)]
pub struct IndustryOption {
    pub value: IndustryType,
    pub label: &'static str,
}

/// Get the caller's profile
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let service = ProfileService::new(state.db.clone());
    Ok(Json(service.get(user.user_id).await?))
}

/// Submit the onboarding form
pub async fn complete_onboarding(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<OnboardingForm>,
) -> AppResult<(StatusCode, Json<OnboardingResponse>)> {
    let service = ProfileService::new(state.db.clone());
    let profile = service.complete_onboarding(&user, form).await?;
    let access = AccessState::for_session(true, Some(&profile)).decide(None);

    Ok((StatusCode::CREATED, Json(OnboardingResponse { profile, access })))
}

/// Industry choices offered for a role
pub async fn list_industries(Path(role): Path<UserRole>) -> Json<Vec<IndustryOption>> {
    let options = role
        .industry_options()
        .iter()
        .map(|&value| IndustryOption {
            value,
            label: value.label(),
        })
        .collect();

    Json(options)
}
