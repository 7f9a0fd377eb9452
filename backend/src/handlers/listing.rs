//! Listing handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use shared::{ListingFilter, NewListing, OrganicWasteListing};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::{ListingService, ProfileService};
use crate::AppState;

/// Browse available listings.
/// Without an explicit country the buyer's profile country is used.
pub async fn browse_listings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(mut filter): Query<ListingFilter>,
) -> AppResult<Json<Vec<OrganicWasteListing>>> {
    let (access, profile) = ProfileService::new(state.db.clone())
        .access_state(user.user_id)
        .await?;

    if !access.can_browse() {
        return Err(AppError::Forbidden {
            message: "Complete onboarding to browse the marketplace".to_string(),
            message_es: "Completa tu registro para ver el mercado".to_string(),
        });
    }

    if filter.country.is_none() {
        filter.country = profile.map(|p| p.country);
    }

    let service = ListingService::new(state.db.clone());
    Ok(Json(service.browse(&filter).await?))
}

/// Publish a listing
pub async fn create_listing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<NewListing>,
) -> AppResult<(StatusCode, Json<OrganicWasteListing>)> {
    let (access, profile) = ProfileService::new(state.db.clone())
        .access_state(user.user_id)
        .await?;

    let service = ListingService::new(state.db.clone());
    let listing = service.publish(&user, access, profile.as_ref(), body).await?;

    Ok((StatusCode::CREATED, Json(listing)))
}

/// The caller's own listings
pub async fn my_listings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<OrganicWasteListing>>> {
    let service = ListingService::new(state.db.clone());
    Ok(Json(service.list_for_seller(&user.email).await?))
}
