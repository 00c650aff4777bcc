//! Resolved identity value objects.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

/// Access role granted to a resolved user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// The `user` object embedded in Mini App init data.
///
/// Only `id` is required; the platform omits the name fields for some
/// accounts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Identity returned to the client after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
    pub role: Role,
    /// True only when the payload carried a hash that matched the bot token.
    pub verified: bool,
}

impl ResolvedIdentity {
    pub fn new(user_id: UserId, user: TelegramUser, role: Role, verified: bool) -> Self {
        Self {
            user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            role,
            verified,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
