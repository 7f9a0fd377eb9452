//! BioMarket backend
//!
//! Marketplace where farms and agro-industry sell organic waste to biogas
//! and energy producers. Buyers are verified before they can purchase.

use axum::{routing::get, Router};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod error;
mod external;
mod handlers;
mod middleware;
mod routes;
mod services;

pub use config::Config;

const DEFAULT_LOG_FILTER: &str = "biomarket_server=debug,tower_http=debug,sqlx=warn";

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    dotenvy::dotenv().ok();
    let config = Config::load()?;
    let addr = config.server.socket_addr()?;

    tracing::info!(environment = %config.environment, "Starting BioMarket server");

    let db = connect(&config.database).await?;
    if config.is_development() {
        sqlx::migrate!("./migrations").run(&db).await?;
        tracing::info!("Migrations applied");
    }

    let app = create_app(AppState {
        db,
        config: Arc::new(config),
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn connect(database: &config::DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database.url)
        .await?;

    tracing::info!(
        max_connections = database.max_connections,
        "Database pool ready"
    );
    Ok(pool)
}

fn create_app(state: AppState) -> Router {
    // The browser client is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "BioMarket API v1" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api/v1", routes::api_routes(&state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}
