//! Application layer - Background services that drive the domain.

mod liveness_monitor;

pub use liveness_monitor::{LivenessMonitor, LivenessMonitorConfig};
