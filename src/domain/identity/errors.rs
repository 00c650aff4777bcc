//! Identity resolution errors.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while resolving client init data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// No init data was supplied.
    #[error("missing initData")]
    MissingInitData,

    /// Init data has no `user` field.
    #[error("no user data")]
    MissingUser,

    /// The `user` field is not a JSON object with a positive numeric id.
    #[error("invalid user data")]
    InvalidUser(String),

    /// The HMAC could not be computed.
    #[error("signature error: {0}")]
    Signing(String),
}

impl IdentityError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::MissingInitData
            | IdentityError::MissingUser
            | IdentityError::InvalidUser(_) => StatusCode::BAD_REQUEST,
            IdentityError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
