//! Status Handlers
//!
//! Liveness and build information under `/.well-known/tokens/status`.

use axum::{extract::State, routing::get, Json, Router};

use crate::infrastructure::driving_adapters::api_rest::dto::token::{HealthResponseDto, VersionResponseDto};
use crate::infrastructure::driving_adapters::api_rest::AppState;

/// Create the router for status endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/version", get(version))
        .route("/health", get(health))
}

/// GET /status/ping
async fn ping() -> &'static str {
    "pong"
}

/// GET /status/version
async fn version(State(state): State<AppState>) -> Json<VersionResponseDto> {
    let environment = if state.config.is_production() { "prod" } else { "dev" };
    Json(VersionResponseDto {
        version: env!("CARGO_PKG_VERSION"),
        environment,
    })
}

/// GET /status/health
async fn health() -> Json<HealthResponseDto> {
    Json(HealthResponseDto {
        current_time: chrono::Utc::now().to_rfc3339(),
        health: "ok",
    })
}
