//! Dashboard handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::dashboard::{BuyerDashboard, SellerDashboard};
use crate::services::DashboardService;
use crate::AppState;

pub async fn seller_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<SellerDashboard>> {
    let service = DashboardService::new(state.db.clone());
    Ok(Json(service.seller(&user).await?))
}

pub async fn buyer_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<BuyerDashboard>> {
    let service = DashboardService::new(state.db.clone());
    Ok(Json(service.buyer(&user).await?))
}
