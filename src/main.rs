mod config;
mod models;
mod routes;
mod services;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::catalog_source::CatalogSource;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub source: CatalogSource,
    pub start_time: Instant,
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/ready", get(routes::health::ready))
        .route("/live", get(routes::health::live))
        // Catalog endpoints
        .route("/api/channels", get(routes::catalog::get_channels))
        .route("/api/categories", get(routes::catalog::get_categories))
        .route(
            "/api/categories/normalize",
            post(routes::catalog::normalize_keys),
        )
        .route(
            "/api/categories/:category/groups",
            get(routes::catalog::get_groups),
        )
        .route(
            "/api/categories/:category/groups/:group/channels",
            get(routes::catalog::get_group_channels),
        )
        // Series endpoints
        .route("/api/series/parse", get(routes::series::parse_name))
        .route(
            "/api/series/:category/:group",
            get(routes::series::get_index),
        )
        .route(
            "/api/series/:category/:group/shows",
            get(routes::series::get_shows),
        )
        .route(
            "/api/series/:category/:group/seasons",
            get(routes::series::get_seasons),
        )
        .route(
            "/api/series/:category/:group/episodes",
            get(routes::series::get_episodes),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signaltv_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting SignalTV Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.node_env);

    let source = CatalogSource::new(&config)?;
    if source.is_configured() {
        tracing::info!("Catalog source: {}", source.kind());
    } else {
        tracing::warn!("No CATALOG_FILE, CATALOG_URL or PLAYLIST_URLS set, all listings will be empty");
    }

    // Build application state
    let state = Arc::new(AppState {
        config,
        source,
        start_time: Instant::now(),
    });

    // Warm the catalog cache in the background
    let warm_state = state.clone();
    tokio::spawn(async move {
        let snapshot = warm_state.source.snapshot().await;
        if snapshot.catalog.is_empty() {
            tracing::warn!("Catalog is empty after warm-up");
        } else {
            tracing::info!("Catalog warmed: {} entries", snapshot.catalog.entry_count());
        }
    });

    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
