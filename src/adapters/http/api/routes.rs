//! Axum router for the health and init endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{health, init, ApiAppState};

/// Create the API router.
///
/// # Routes
/// - `GET /health` - Relay counters
/// - `POST /api/init` - Resolve Mini App init data
pub fn api_router() -> Router<ApiAppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/init", post(init))
}
