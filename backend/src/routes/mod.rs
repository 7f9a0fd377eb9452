//! Route definitions for the BioMarket platform

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Multipart framing on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create API routes. Protected groups verify tokens with the secret in `state`.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Session decision (optional auth)
        .route("/session", get(handlers::get_session))
        // Industry choices (public, used by the onboarding form)
        .route("/onboarding/industries/:role", get(handlers::list_industries))
        // Auth routes
        .nest("/auth", auth_routes(state))
        // Protected routes
        .merge(profile_routes(state))
        .nest("/listings", listing_routes(state))
        .nest("/purchases", purchase_routes(state))
        .nest("/transactions", transaction_routes(state))
        .nest("/dashboard", dashboard_routes(state))
        .nest("/uploads", upload_routes(state))
}

/// Authentication routes
fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route("/logout", post(handlers::logout))
}

/// Profile and onboarding routes (protected)
fn profile_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(handlers::get_profile))
        .route("/onboarding", post(handlers::complete_onboarding))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Listing routes (protected)
fn listing_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::browse_listings).post(handlers::create_listing),
        )
        .route("/mine", get(handlers::my_listings))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Purchase routes (protected)
fn purchase_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_purchase))
        .route("/quote", post(handlers::quote_purchase))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Transaction history routes (protected)
fn transaction_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_transactions))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Dashboard routes (protected)
fn dashboard_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/seller", get(handlers::seller_dashboard))
        .route("/buyer", get(handlers::buyer_dashboard))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Upload routes (protected)
fn upload_routes(state: &AppState) -> Router<AppState> {
    let max_upload_bytes = state.config.storage.max_upload_bytes;

    Router::new()
        .route("/", post(handlers::upload_file))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD_BYTES))
}
