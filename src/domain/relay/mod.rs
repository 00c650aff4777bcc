//! Relay domain: connections, matchmaking and session signaling.
//!
//! Two anonymous clients arrive independently, get paired in arrival order
//! and then exchange opaque negotiation payloads through the relay until one
//! side leaves or drops.

mod connection;
mod connection_state;
mod controller;
mod messages;
mod queue;

pub use connection::Connection;
pub use connection_state::ConnectionState;
pub use controller::{DisconnectReason, RelayController, RelaySnapshot, SweepReport};
pub use messages::{DecodeError, PeerCommand, PeerEvent};
pub use queue::MatchmakingQueue;
