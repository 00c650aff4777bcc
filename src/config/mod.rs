//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SIGNAL_RELAY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use signal_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod error;
mod identity;
mod relay;
mod server;

pub use error::{ConfigError, ValidationError};
pub use identity::IdentityConfig;
pub use relay::RelayConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// development relay on port 3000.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, static assets)
    #[serde(default)]
    pub server: ServerConfig,

    /// Relay tuning (liveness interval, frame limits)
    #[serde(default)]
    pub relay: RelayConfig,

    /// Mini App identity (bot token, admin ids)
    #[serde(default)]
    pub identity: IdentityConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SIGNAL_RELAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SIGNAL_RELAY__SERVER__PORT=3000` -> `server.port = 3000`
    /// - `SIGNAL_RELAY__RELAY__LIVENESS_INTERVAL_SECS=15` -> `relay.liveness_interval_secs = 15`
    /// - `SIGNAL_RELAY__IDENTITY__BOT_TOKEN=...` -> `identity.bot_token = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SIGNAL_RELAY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.relay.validate()?;
        self.identity.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "SIGNAL_RELAY__SERVER__PORT",
        "SIGNAL_RELAY__SERVER__ENVIRONMENT",
        "SIGNAL_RELAY__RELAY__LIVENESS_INTERVAL_SECS",
        "SIGNAL_RELAY__RELAY__OUTBOUND_BUFFER",
        "SIGNAL_RELAY__IDENTITY__BOT_TOKEN",
        "SIGNAL_RELAY__IDENTITY__ADMIN_IDS",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn lock() -> std::sync::MutexGuard<'static, ()> {
        ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn test_load_with_empty_environment_uses_defaults() {
        let _guard = lock();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.relay.liveness_interval_secs, 30);
        assert!(config.identity.bot_token().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = lock();
        env::set_var("SIGNAL_RELAY__SERVER__PORT", "4100");
        env::set_var("SIGNAL_RELAY__RELAY__LIVENESS_INTERVAL_SECS", "15");
        env::set_var("SIGNAL_RELAY__RELAY__OUTBOUND_BUFFER", "16");
        env::set_var("SIGNAL_RELAY__IDENTITY__BOT_TOKEN", "123:abc");
        env::set_var("SIGNAL_RELAY__IDENTITY__ADMIN_IDS", "7,8");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.relay.liveness_interval_secs, 15);
        assert_eq!(config.relay.outbound_buffer, 16);
        assert_eq!(config.identity.bot_token(), Some("123:abc"));
        assert_eq!(config.identity.admin_id_set().unwrap().len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_production() {
        let _guard = lock();
        env::set_var("SIGNAL_RELAY__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_unparseable_value_is_load_error() {
        let _guard = lock();
        env::set_var("SIGNAL_RELAY__SERVER__PORT", "not-a-port");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_validate_rejects_bad_section() {
        let config = AppConfig {
            relay: RelayConfig {
                outbound_buffer: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidOutboundBuffer));
    }
}
