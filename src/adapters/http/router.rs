//! Top-level HTTP application.
//!
//! Combines the WebSocket endpoint, the REST API and optional static client
//! assets, then applies tracing, CORS and request timeout layers.

use std::sync::Arc;
use std::time::Duration;

use ::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{relay_socket_router, RelaySocketState};
use crate::config::{RelayConfig, ServerConfig};
use crate::domain::relay::RelayController;
use crate::ports::IdentityResolver;

use super::api::{api_router, ApiAppState};

/// Shared dependencies for the whole HTTP surface.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayController>,
    pub identity: Arc<dyn IdentityResolver>,
    pub relay_config: RelayConfig,
}

/// Build the complete router.
///
/// # Routes
/// - `GET /ws` - Relay WebSocket
/// - `GET /health` - Relay counters
/// - `POST /api/init` - Identity resolution
/// - anything else - `server.static_dir` with `index.html` fallback, if set
pub fn app_router(state: AppState, server: &ServerConfig) -> Router {
    let socket_state = RelaySocketState::new(state.relay.clone(), &state.relay_config);
    let api_state = ApiAppState {
        relay: state.relay,
        identity: state.identity,
    };

    let mut app = Router::new()
        .merge(relay_socket_router().with_state(socket_state))
        .merge(api_router().with_state(api_state));

    if let Some(dir) = server.static_dir() {
        let index = ServeFile::new(dir.join("index.html"));
        app = app.fallback_service(ServeDir::new(dir).fallback(index));
    }

    app.layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(&origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
