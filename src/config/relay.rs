//! Relay configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Relay tuning (liveness, frame limits, buffering)
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Seconds between liveness sweeps
    #[serde(default = "default_liveness_interval")]
    pub liveness_interval_secs: u64,

    /// Largest inbound WebSocket message in bytes
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,

    /// Outbound frames buffered per connection
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
}

impl RelayConfig {
    pub fn liveness_interval(&self) -> Duration {
        Duration::from_secs(self.liveness_interval_secs)
    }

    /// Validate relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=3600).contains(&self.liveness_interval_secs) {
            return Err(ValidationError::InvalidLivenessInterval);
        }
        if !(1024..=16 * 1024 * 1024).contains(&self.max_message_bytes) {
            return Err(ValidationError::InvalidMaxMessageSize);
        }
        if !(1..=4096).contains(&self.outbound_buffer) {
            return Err(ValidationError::InvalidOutboundBuffer);
        }
        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            liveness_interval_secs: default_liveness_interval(),
            max_message_bytes: default_max_message_bytes(),
            outbound_buffer: default_outbound_buffer(),
        }
    }
}

fn default_liveness_interval() -> u64 {
    30
}

fn default_max_message_bytes() -> usize {
    100 * 1024
}

fn default_outbound_buffer() -> usize {
    64
}
