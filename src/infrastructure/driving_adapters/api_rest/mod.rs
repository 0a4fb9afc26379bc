//! REST API Module
//!
//! Contains HTTP handlers, DTOs, and middleware for the REST API.

pub mod dto;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::Method,
    middleware::from_fn,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::TokenQueryResolver;
use crate::infrastructure::driven_adapters::config::AppConfig;

use self::handlers::{status, tokens};
use self::middleware::request_id_middleware;

/// How long browsers may cache a preflight response
const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub resolver: Arc<TokenQueryResolver>,
}

/// Build the full HTTP surface with tracing, request ids and CORS
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/.well-known/tokens.json", get(tokens::list_tokens))
        .nest(
            "/.well-known/tokens",
            tokens::router().nest("/status", status::router()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any)
                .max_age(CORS_MAX_AGE),
        )
        .with_state(state)
}
