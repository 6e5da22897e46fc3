use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Root endpoint - basic status
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "SignalTV Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "catalog": "/api/channels"
    }))
}

/// Catalog cache info
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogStats {
    source: &'static str,
    loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    age_secs: Option<u64>,
}

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    uptime: u64,
    environment: String,
    catalog: CatalogStats,
}

/// GET /health - Health check with catalog cache state
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let age = state.source.cache_age().await;

    // Without a source every listing is empty, the server is up but useless
    let status = if state.source.is_configured() { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        uptime: state.start_time.elapsed().as_secs(),
        environment: state.config.node_env.clone(),
        catalog: CatalogStats {
            source: state.source.kind(),
            loaded: age.is_some(),
            age_secs: age.map(|a| a.as_secs()),
        },
    })
}

/// GET /metrics - Prometheus metrics
pub async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                b"Internal Server Error".to_vec(),
            )
        }
    }
}

/// Readiness probe
pub async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if !state.source.is_configured() {
        (StatusCode::OK, "ready (no catalog source configured)")
    } else if state.source.cache_age().await.is_some() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready - catalog not loaded yet")
    }
}

/// Liveness probe
pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, "alive")
}
