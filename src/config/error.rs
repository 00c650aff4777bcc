//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("Static directory '{0}' does not exist")]
    MissingStaticDir(String),

    #[error("Liveness interval must be between 1 and 3600 seconds")]
    InvalidLivenessInterval,

    #[error("Max message size must be between 1 KiB and 16 MiB")]
    InvalidMaxMessageSize,

    #[error("Outbound buffer must be between 1 and 4096 frames")]
    InvalidOutboundBuffer,

    #[error("Invalid admin id '{0}'")]
    InvalidAdminId(String),

    #[error("Bot token must look like '<bot id>:<secret>'")]
    InvalidBotToken,
}
