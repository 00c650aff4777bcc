//! IdentityResolver port - Interface for platform-issued identity tokens.
//!
//! Resolves the init data a Mini App client receives from the messaging
//! platform into a stable numeric user id and a role. The relay core never
//! calls this; it backs the HTTP `/api/init` endpoint only.

use async_trait::async_trait;

use crate::domain::identity::{IdentityError, ResolvedIdentity};

/// Port for resolving client init data into an identity.
///
/// Implementations decide whether the payload is cryptographically
/// verified. An unverified identity is still returned with
/// `verified = false` so callers can choose how strict to be.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve raw init data (URL-encoded query string).
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if the payload is missing or unparseable.
    async fn resolve(&self, init_data: &str) -> Result<ResolvedIdentity, IdentityError>;
}
