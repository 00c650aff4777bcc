//! HTTP handlers for health and init endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::domain::foundation::Timestamp;
use crate::domain::identity::IdentityError;
use crate::domain::relay::RelayController;
use crate::ports::IdentityResolver;

use super::dto::{ErrorResponse, HealthResponse, InitRequest, InitResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Dependencies for the API handlers.
#[derive(Clone)]
pub struct ApiAppState {
    pub relay: Arc<RelayController>,
    pub identity: Arc<dyn IdentityResolver>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Type
// ════════════════════════════════════════════════════════════════════════════════

/// API error that renders as `{ok: false, error}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(error: IdentityError) -> Self {
        match error.status_code() {
            StatusCode::BAD_REQUEST => ApiError::BadRequest(error.to_string()),
            _ => {
                tracing::error!(error = %error, "identity resolution failed");
                ApiError::Internal("internal error".to_string())
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// `GET /health` - relay counters. Read-only.
pub async fn health(State(state): State<ApiAppState>) -> Json<HealthResponse> {
    let snapshot = state.relay.snapshot().await;
    Json(HealthResponse::ok(snapshot, Timestamp::now().to_rfc3339()))
}

/// `POST /api/init` - resolve Mini App init data into an identity.
pub async fn init(
    State(state): State<ApiAppState>,
    payload: Result<Json<InitRequest>, JsonRejection>,
) -> Result<Json<InitResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "init body rejected");
            InitRequest::default()
        }
    };

    let identity = state.identity.resolve(&request.init_data).await?;
    tracing::info!(
        user_id = %identity.user_id,
        verified = identity.verified,
        role = %identity.role,
        "init resolved"
    );
    Ok(Json(identity.into()))
}
