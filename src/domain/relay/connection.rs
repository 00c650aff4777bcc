//! One relay connection as seen by the controller.
//!
//! A `Connection` pairs the transport's outbound [`PeerSink`] with the
//! bookkeeping the controller needs: lifecycle state, the partner link and
//! the liveness flag. Only the controller mutates it.

use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::{ConnectionId, StateMachine, ValidationError};
use crate::ports::{DeliveryError, PeerSink};

use super::{ConnectionState, PeerEvent};

pub struct Connection {
    id: ConnectionId,
    state: ConnectionState,
    /// Lookup key, never an owning edge.
    partner: Option<ConnectionId>,
    awaiting_ack: bool,
    sink: Arc<dyn PeerSink>,
}

impl Connection {
    /// Create a fresh `Waiting` connection.
    pub fn new(id: ConnectionId, sink: Arc<dyn PeerSink>) -> Self {
        Self {
            id,
            state: ConnectionState::Waiting,
            partner: None,
            awaiting_ack: false,
            sink,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn partner(&self) -> Option<ConnectionId> {
        self.partner
    }

    pub fn is_open(&self) -> bool {
        self.sink.is_open()
    }

    /// Waiting, unpartnered and still writable.
    pub fn is_pairable(&self) -> bool {
        self.state == ConnectionState::Waiting && self.partner.is_none() && self.is_open()
    }

    /// Deliver an event. Never panics; a closed transport is reported as
    /// [`DeliveryError::Closed`] without touching the sink.
    pub fn send(&self, event: &PeerEvent) -> Result<(), DeliveryError> {
        if !self.sink.is_open() {
            return Err(DeliveryError::Closed);
        }
        self.sink.deliver(event)
    }

    pub(super) fn transition_to(&mut self, target: ConnectionState) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(target)?;
        Ok(())
    }

    pub(super) fn link(&mut self, partner: ConnectionId) {
        self.partner = Some(partner);
    }

    pub(super) fn take_partner(&mut self) -> Option<ConnectionId> {
        self.partner.take()
    }

    /// Clear the link only if it still points at `partner`.
    pub(super) fn unlink_from(&mut self, partner: ConnectionId) -> bool {
        if self.partner == Some(partner) {
            self.partner = None;
            true
        } else {
            false
        }
    }

    pub(super) fn awaiting_ack(&self) -> bool {
        self.awaiting_ack
    }

    pub(super) fn acknowledge(&mut self) {
        self.awaiting_ack = false;
    }

    /// Mark unacknowledged and send a new probe.
    pub(super) fn probe(&mut self) -> Result<(), DeliveryError> {
        self.awaiting_ack = true;
        if !self.sink.is_open() {
            return Err(DeliveryError::Closed);
        }
        self.sink.probe()
    }

    pub(super) fn terminate(&self) {
        self.sink.terminate();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("partner", &self.partner)
            .field("awaiting_ack", &self.awaiting_ack)
            .field("open", &self.is_open())
            .finish()
    }
}
