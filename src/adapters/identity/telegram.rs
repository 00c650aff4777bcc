//! Telegram Mini App identity resolver.
//!
//! Implements the `IdentityResolver` port over Mini App init data.
//!
//! # Security
//!
//! - HMAC-SHA256 verification with constant-time comparison
//! - Bot token handled via `secrecy::SecretString`
//! - Unverified payloads still resolve, flagged `verified = false`

use std::collections::HashSet;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::{IdentityConfig, ValidationError};
use crate::domain::foundation::UserId;
use crate::domain::identity::{IdentityError, InitData, ResolvedIdentity, Role};
use crate::ports::IdentityResolver;

/// Resolves Mini App init data, verifying it when a bot token is set.
pub struct TelegramIdentityResolver {
    bot_token: Option<SecretString>,
    admin_ids: HashSet<UserId>,
}

impl TelegramIdentityResolver {
    pub fn new(bot_token: Option<String>, admin_ids: HashSet<UserId>) -> Self {
        Self {
            bot_token: bot_token.map(SecretString::new),
            admin_ids,
        }
    }

    /// Build from the identity config section.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, ValidationError> {
        Ok(Self::new(
            config.bot_token().map(str::to_string),
            config.admin_id_set()?,
        ))
    }

    pub fn verifies(&self) -> bool {
        self.bot_token.is_some()
    }

    fn role_for(&self, user_id: &UserId) -> Role {
        if self.admin_ids.contains(user_id) {
            Role::Admin
        } else {
            Role::User
        }
    }
}

#[async_trait]
impl IdentityResolver for TelegramIdentityResolver {
    async fn resolve(&self, init_data: &str) -> Result<ResolvedIdentity, IdentityError> {
        let data = InitData::parse(init_data)?;
        let user = data.user()?;
        let user_id =
            UserId::new(user.id).map_err(|e| IdentityError::InvalidUser(e.to_string()))?;

        let verified = match &self.bot_token {
            Some(token) => data.verify(token.expose_secret())?,
            None => false,
        };
        if !verified {
            tracing::debug!(user_id = %user_id, has_hash = data.hash().is_some(), "init data not verified");
        }

        let role = self.role_for(&user_id);
        Ok(ResolvedIdentity::new(user_id, user, role, verified))
    }
}
