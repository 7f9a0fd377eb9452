//! Purchase and transaction handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use shared::Transaction;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::purchase::{Party, PurchaseInput, PurchaseReceipt, QuoteResponse};
use crate::services::PurchaseService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buyer,
    Seller,
}

#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    pub side: Option<Side>,
}

/// Price a purchase
pub async fn quote_purchase(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(body): Json<PurchaseInput>,
) -> AppResult<Json<QuoteResponse>> {
    let service = PurchaseService::new(state.db.clone());
    Ok(Json(service.quote(&body).await?))
}

/// Execute a purchase
pub async fn create_purchase(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<PurchaseInput>,
) -> AppResult<(StatusCode, Json<PurchaseReceipt>)> {
    let service = PurchaseService::new(state.db.clone());
    let receipt = service.purchase(&user, body).await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Transaction history, buyer side unless `?side=seller`
pub async fn list_transactions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<TransactionQuery>,
) -> AppResult<Json<Vec<Transaction>>> {
    let party = match query.side {
        Some(Side::Seller) => Party::Seller,
        Some(Side::Buyer) | None => Party::Buyer,
    };

    let service = PurchaseService::new(state.db.clone());
    Ok(Json(service.history(&user.email, party).await?))
}
