//! Identity configuration (Mini App init data)

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

use crate::domain::foundation::UserId;

use super::error::ValidationError;

/// Identity configuration
///
/// Without a bot token every resolved identity is reported as unverified.
#[derive(Clone, Default, Deserialize)]
pub struct IdentityConfig {
    /// Bot token used to derive the init data HMAC key
    pub bot_token: Option<String>,

    /// Admin user ids (comma-separated)
    pub admin_ids: Option<String>,
}

impl IdentityConfig {
    /// Bot token, treating a blank value as unset
    pub fn bot_token(&self) -> Option<&str> {
        self.bot_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Parse the admin id list
    pub fn admin_id_set(&self) -> Result<HashSet<UserId>, ValidationError> {
        let Some(raw) = self.admin_ids.as_deref() else {
            return Ok(HashSet::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<UserId>()
                    .map_err(|_| ValidationError::InvalidAdminId(s.to_string()))
            })
            .collect()
    }

    /// Validate identity configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(token) = self.bot_token() {
            let well_formed = token
                .split_once(':')
                .is_some_and(|(id, secret)| {
                    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) && !secret.is_empty()
                });
            if !well_formed {
                return Err(ValidationError::InvalidBotToken);
            }
        }
        self.admin_id_set()?;
        Ok(())
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("bot_token", &self.bot_token().map(|_| "[REDACTED]"))
            .field("admin_ids", &self.admin_ids)
            .finish()
    }
}
