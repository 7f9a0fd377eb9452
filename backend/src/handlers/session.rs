//! Session handler: where the user may go and what they may do

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use shared::{AccessDecision, Page};

use crate::middleware::MaybeUser;
use crate::services::ProfileService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    /// Page the client is trying to open
    pub page: Option<Page>,
}

/// Access decision for the caller.
///
/// Never fails: a missing or bad token, or a profile lookup error, yields
/// the guest decision.
pub async fn get_session(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<SessionQuery>,
) -> Json<AccessDecision> {
    let Some(user) = user else {
        return Json(AccessDecision::guest());
    };

    let service = ProfileService::new(state.db.clone());
    match service.access_state(user.user_id).await {
        Ok((access, _)) => Json(access.decide(query.page)),
        Err(e) => {
            tracing::warn!(user_id = %user.user_id, "Session lookup failed, serving guest: {}", e);
            Json(AccessDecision::guest())
        }
    }
}
