//! Mini App init data parsing and HMAC verification.
//!
//! Init data is a URL-encoded query string issued by the messaging platform.
//! Verification follows the platform's scheme:
//!
//! 1. Drop `hash`; render every other pair as `key=value`, sort, join with `\n`
//! 2. `secret = HMAC-SHA256(key = "WebAppData", msg = bot_token)`
//! 3. `expected = hex(HMAC-SHA256(key = secret, msg = data_check_string))`
//! 4. Compare `expected` with `hash` in constant time

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::{IdentityError, TelegramUser};

const HASH_KEY: &str = "hash";
const USER_KEY: &str = "user";
const SECRET_KEY_SEED: &[u8] = b"WebAppData";

/// Decoded init data pairs, in payload order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitData {
    pairs: Vec<(String, String)>,
}

impl InitData {
    /// Decode a query string.
    ///
    /// # Errors
    ///
    /// Returns `MissingInitData` for an empty or blank payload.
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(IdentityError::MissingInitData);
        }
        let pairs = url::form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Ok(Self { pairs })
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn hash(&self) -> Option<&str> {
        self.get(HASH_KEY).filter(|h| !h.is_empty())
    }

    /// Parse the embedded `user` JSON.
    pub fn user(&self) -> Result<TelegramUser, IdentityError> {
        let raw = self.get(USER_KEY).ok_or(IdentityError::MissingUser)?;
        serde_json::from_str(raw).map_err(|e| IdentityError::InvalidUser(e.to_string()))
    }

    /// Sorted `key=value` lines of every pair except `hash`.
    pub fn data_check_string(&self) -> String {
        let mut lines: Vec<String> = self
            .pairs
            .iter()
            .filter(|(k, _)| k != HASH_KEY)
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        lines.sort();
        lines.join("\n")
    }

    /// Check the payload hash against `bot_token`.
    ///
    /// Returns `Ok(false)` when there is no hash or it is not valid hex.
    pub fn verify(&self, bot_token: &str) -> Result<bool, IdentityError> {
        let Some(hash) = self.hash() else {
            return Ok(false);
        };
        let Ok(provided) = hex::decode(hash) else {
            return Ok(false);
        };
        let expected = compute_signature(bot_token, &self.data_check_string())?;
        Ok(constant_time_compare(&expected, &provided))
    }
}

/// HMAC of a data-check string under the key derived from `bot_token`.
pub fn compute_signature(bot_token: &str, data_check_string: &str) -> Result<Vec<u8>, IdentityError> {
    let secret = hmac_sha256(SECRET_KEY_SEED, bot_token.as_bytes())?;
    hmac_sha256(&secret, data_check_string.as_bytes())
}

/// Hex form of [`compute_signature`], as the platform sends it.
pub fn sign_hex(bot_token: &str, data_check_string: &str) -> Result<String, IdentityError> {
    compute_signature(bot_token, data_check_string).map(hex::encode)
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Vec<u8>, IdentityError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| IdentityError::Signing(e.to_string()))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
