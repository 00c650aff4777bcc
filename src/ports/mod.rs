//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PeerSink` - Non-blocking outbound half of one relay connection
//! - `IdentityResolver` - Resolves Mini App init data into an identity

mod identity_resolver;
mod peer_sink;

pub use identity_resolver::IdentityResolver;
pub use peer_sink::{DeliveryError, PeerSink};
