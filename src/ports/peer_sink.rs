//! PeerSink port - Outbound half of one relay connection.
//!
//! The relay controller owns pairing state and talks to each remote peer only
//! through this trait. Every method is synchronous and must not block: an
//! implementation queues the work for a writer task and reports failure
//! immediately instead of awaiting the network.
//!
//! ## Failure model
//!
//! The controller does not distinguish between variants. What it does
//! depends on which event failed:
//!
//! | Failed event | Controller reaction |
//! |--------------|---------------------|
//! | `waiting`, `match`, probe | connection is discarded |
//! | `match` retraction | connection is discarded |
//! | `signal`, `partner_disconnected` | event is dropped, connection kept |

use thiserror::Error;

use crate::domain::relay::PeerEvent;

/// Why an outbound event did not reach the transport queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The transport is closed or its writer has stopped.
    #[error("transport is closed")]
    Closed,

    /// The outbound buffer is full.
    #[error("outbound buffer is full")]
    Backpressure,

    /// The event could not be encoded.
    #[error("failed to encode event: {0}")]
    Encode(String),
}

/// Outbound channel to one remote peer.
pub trait PeerSink: Send + Sync {
    /// Queue an event for delivery.
    fn deliver(&self, event: &PeerEvent) -> Result<(), DeliveryError>;

    /// Queue a liveness probe. The peer acknowledges out of band.
    fn probe(&self) -> Result<(), DeliveryError>;

    /// Forcibly close the transport. Idempotent.
    fn terminate(&self);

    /// Returns true while the transport accepts writes.
    fn is_open(&self) -> bool;
}
