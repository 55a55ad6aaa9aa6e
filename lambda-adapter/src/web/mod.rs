//! Local HTTP surface for the gateway adapter.
//!
//! Serves the same contract as the serverless deployment, so deliveries can
//! be pointed at a plain HTTP server (or a tunnel) during development:
//! - `GET /health` answers `{"status":"ok"}`
//! - every other request goes through the adapter unchanged

pub mod handlers;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use handlers::{deliver, health, AppState, HealthResponse};

/// Build the router with request tracing attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(deliver)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
