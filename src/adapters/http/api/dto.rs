//! HTTP DTOs for the health and init endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::identity::{ResolvedIdentity, Role};
use crate::domain::relay::RelaySnapshot;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/init`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitRequest {
    #[serde(default)]
    pub init_data: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Liveness snapshot for `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub connections: usize,
    pub queue: usize,
    pub sessions: usize,
}

impl HealthResponse {
    pub fn ok(snapshot: RelaySnapshot, timestamp: String) -> Self {
        Self {
            status: "ok",
            timestamp,
            connections: snapshot.connections,
            queue: snapshot.queue,
            sessions: snapshot.sessions,
        }
    }
}

/// Successful init response.
#[derive(Debug, Clone, Serialize)]
pub struct InitResponse {
    pub ok: bool,
    pub verified: bool,
    pub user: UserView,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
    pub role: Role,
}

impl From<ResolvedIdentity> for InitResponse {
    fn from(identity: ResolvedIdentity) -> Self {
        Self {
            ok: true,
            verified: identity.verified,
            user: UserView {
                id: identity.user_id.as_i64(),
                first_name: identity.first_name,
                last_name: identity.last_name,
                username: identity.username,
                role: identity.role,
            },
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::identity::TelegramUser;
    use serde_json::json;

    #[test]
    fn init_request_reads_camel_case_and_defaults() {
        let req: InitRequest = serde_json::from_str(r#"{"initData":"a=b"}"#).unwrap();
        assert_eq!(req.init_data, "a=b");

        let req: InitRequest = serde_json::from_str("{}").unwrap();
        assert!(req.init_data.is_empty());
    }

    #[test]
    fn init_response_shape() {
        let identity = ResolvedIdentity::new(
            UserId::new(5).unwrap(),
            TelegramUser {
                id: 5,
                first_name: "Ann".into(),
                last_name: String::new(),
                username: None,
            },
            Role::Admin,
            true,
        );
        let value = serde_json::to_value(InitResponse::from(identity)).unwrap();
        assert_eq!(
            value,
            json!({
                "ok": true,
                "verified": true,
                "user": {
                    "id": 5,
                    "first_name": "Ann",
                    "last_name": "",
                    "username": null,
                    "role": "admin"
                }
            })
        );
    }

    #[test]
    fn error_response_shape() {
        let value = serde_json::to_value(ErrorResponse::new("no user data")).unwrap();
        assert_eq!(value, json!({"ok": false, "error": "no user data"}));
    }
}
