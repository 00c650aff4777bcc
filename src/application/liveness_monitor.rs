//! LivenessMonitor - Background sweep that reaps unresponsive connections.
//!
//! Every period `T` the monitor asks the relay to:
//! 1. Tear down connections that did not answer the previous probe
//! 2. Probe everything else
//! 3. Drop queue entries that are no longer waiting
//!
//! A peer that goes silent is therefore reaped after one to two periods.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 30s | Time between sweeps |

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::domain::relay::{RelayController, SweepReport};

/// Configuration for the LivenessMonitor service.
#[derive(Debug, Clone)]
pub struct LivenessMonitorConfig {
    pub interval: Duration,
}

impl Default for LivenessMonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

impl LivenessMonitorConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Periodic liveness sweeper for the relay.
pub struct LivenessMonitor {
    relay: Arc<RelayController>,
    config: LivenessMonitorConfig,
}

impl LivenessMonitor {
    pub fn new(relay: Arc<RelayController>) -> Self {
        Self::with_config(relay, LivenessMonitorConfig::default())
    }

    pub fn with_config(relay: Arc<RelayController>, config: LivenessMonitorConfig) -> Self {
        Self { relay, config }
    }

    /// Sweep on every tick until the shutdown flag flips to true or its
    /// sender is dropped.
    ///
    /// The first sweep happens one full period after start, so fresh
    /// connections are never probed immediately.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let period = self.config.interval;
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = period.as_secs_f64(), "liveness monitor started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("liveness monitor stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }

    /// Run exactly one sweep.
    pub async fn sweep_once(&self) -> SweepReport {
        let report = self.relay.sweep().await;
        if report.reaped > 0 {
            tracing::info!(
                probed = report.probed,
                reaped = report.reaped,
                purged = report.purged,
                "liveness sweep reaped connections"
            );
        } else {
            tracing::debug!(probed = report.probed, purged = report.purged, "liveness sweep");
        }
        report
    }
}
