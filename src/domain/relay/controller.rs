//! Relay controller.
//!
//! Owns every connection, the matchmaking queue and all partner links behind
//! a single mutex, so pop-and-pair and teardown are atomic with respect to
//! each other.
//!
//! # Lifecycle
//!
//! ```text
//! connect ──► Waiting ──(paired)──► Matched ──(leave / close / reap)──► Closed
//!                └────────────(leave / close / reap)────────────────────▲
//! ```
//!
//! Outbound events go through [`PeerSink`], which never blocks, so the lock
//! is never held across network I/O.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::value::RawValue;
use tokio::sync::Mutex;

use crate::domain::foundation::ConnectionId;
use crate::ports::{DeliveryError, PeerSink};

use super::{Connection, ConnectionState, MatchmakingQueue, PeerCommand, PeerEvent};

/// Why a connection is being torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The client sent `leave`.
    Leave,
    /// The transport closed cleanly.
    TransportClosed,
    /// The transport reported an error.
    TransportError,
    /// The connection missed a liveness probe.
    LivenessTimeout,
    /// A critical event could not be delivered.
    DeliveryFailed,
    /// The process is shutting down.
    Shutdown,
}

impl DisconnectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisconnectReason::Leave => "leave",
            DisconnectReason::TransportClosed => "transport_closed",
            DisconnectReason::TransportError => "transport_error",
            DisconnectReason::LivenessTimeout => "liveness_timeout",
            DisconnectReason::DeliveryFailed => "delivery_failed",
            DisconnectReason::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one liveness sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Connections sent a fresh probe.
    pub probed: usize,
    /// Connections torn down and forgotten.
    pub reaped: usize,
    /// Stale queue entries dropped by the consistency pass.
    pub purged: usize,
}

/// Point-in-time counters for health reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelaySnapshot {
    pub connections: usize,
    pub queue: usize,
    pub sessions: usize,
}

/// Single serializing owner of relay state.
pub struct RelayController {
    state: Mutex<RelayState>,
}

#[derive(Default)]
struct RelayState {
    connections: HashMap<ConnectionId, Connection>,
    queue: MatchmakingQueue,
}

impl RelayController {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RelayState::default()),
        }
    }

    /// Register a new transport, announce `waiting`, then pair it with the
    /// longest-waiting valid candidate or queue it.
    ///
    /// The returned id is always valid to pass back to [`disconnect`]
    /// even if the connection was discarded during the call.
    ///
    /// [`disconnect`]: RelayController::disconnect
    pub async fn connect(&self, sink: Arc<dyn PeerSink>) -> ConnectionId {
        let id = ConnectionId::new();
        let mut state = self.state.lock().await;
        state.connections.insert(id, Connection::new(id, sink));
        tracing::info!(connection_id = %id, "connection opened");

        if let Err(err) = state.send_to(id, &PeerEvent::Waiting) {
            tracing::warn!(connection_id = %id, error = %err, "could not announce waiting");
            state.discard(id, DisconnectReason::DeliveryFailed);
            return id;
        }

        state.pair_or_enqueue(id);
        id
    }

    /// Decode and apply one inbound text frame. Malformed frames are dropped.
    pub async fn handle_text(&self, id: ConnectionId, text: &str) {
        match PeerCommand::decode(text) {
            Ok(command) => self.handle_command(id, command).await,
            Err(err) => {
                tracing::debug!(connection_id = %id, error = %err, "ignoring malformed frame");
            }
        }
    }

    pub async fn handle_command(&self, id: ConnectionId, command: PeerCommand) {
        match command {
            PeerCommand::Signal { data } => self.signal(id, data).await,
            PeerCommand::Leave => self.leave(id).await,
        }
    }

    /// Forward a negotiation payload to the partner, unchanged.
    ///
    /// Dropped without side effects when the sender is not in a session or
    /// the partner is no longer open.
    pub async fn signal(&self, id: ConnectionId, data: Box<RawValue>) {
        let state = self.state.lock().await;
        let Some(conn) = state.connections.get(&id) else {
            tracing::debug!(connection_id = %id, "signal from unknown connection dropped");
            return;
        };
        if conn.state() != ConnectionState::Matched {
            tracing::debug!(connection_id = %id, state = %conn.state(), "signal outside session dropped");
            return;
        }
        let Some(partner) = conn.partner().and_then(|pid| state.connections.get(&pid)) else {
            tracing::debug!(connection_id = %id, "signal without partner dropped");
            return;
        };
        if !partner.is_open() {
            tracing::debug!(connection_id = %id, partner_id = %partner.id(), "partner closed, signal dropped");
            return;
        }

        match partner.send(&PeerEvent::Signal { data }) {
            Ok(()) => {
                tracing::trace!(connection_id = %id, partner_id = %partner.id(), "signal relayed");
            }
            Err(err) => {
                tracing::warn!(
                    connection_id = %id,
                    partner_id = %partner.id(),
                    error = %err,
                    "signal dropped"
                );
            }
        }
    }

    /// End the session. The entry stays registered until the transport
    /// closes. Idempotent.
    pub async fn leave(&self, id: ConnectionId) {
        let mut state = self.state.lock().await;
        state.teardown(id, DisconnectReason::Leave);
    }

    /// Tear down and forget a connection, terminating its transport.
    /// Idempotent; unknown ids are ignored.
    pub async fn disconnect(&self, id: ConnectionId, reason: DisconnectReason) {
        let mut state = self.state.lock().await;
        state.discard(id, reason);
    }

    /// Record a liveness acknowledgement.
    pub async fn acknowledge(&self, id: ConnectionId) {
        let mut state = self.state.lock().await;
        if let Some(conn) = state.connections.get_mut(&id) {
            conn.acknowledge();
        }
    }

    /// Reap connections that missed the previous probe, probe the rest, then
    /// drop queue entries that are no longer waiting.
    pub async fn sweep(&self) -> SweepReport {
        let mut state = self.state.lock().await;
        let mut report = SweepReport::default();
        let mut dead = Vec::new();

        for (id, conn) in state.connections.iter_mut() {
            if conn.awaiting_ack() || !conn.is_open() {
                dead.push(*id);
                continue;
            }
            match conn.probe() {
                Ok(()) => report.probed += 1,
                Err(err) => {
                    tracing::warn!(connection_id = %id, error = %err, "probe could not be queued");
                    dead.push(*id);
                }
            }
        }

        for id in dead {
            if state.discard(id, DisconnectReason::LivenessTimeout) {
                report.reaped += 1;
            }
        }

        let RelayState { connections, queue } = &mut *state;
        report.purged = queue.retain(|id| connections.get(id).is_some_and(Connection::is_pairable));
        if report.purged > 0 {
            tracing::warn!(purged = report.purged, "dropped stale queue entries");
        }

        report
    }

    pub async fn snapshot(&self) -> RelaySnapshot {
        let state = self.state.lock().await;
        let linked = state
            .connections
            .values()
            .filter(|conn| conn.partner().is_some())
            .count();
        RelaySnapshot {
            connections: state.connections.len(),
            queue: state.queue.len(),
            sessions: linked / 2,
        }
    }

    pub async fn partner_of(&self, id: ConnectionId) -> Option<ConnectionId> {
        let state = self.state.lock().await;
        state.connections.get(&id).and_then(Connection::partner)
    }

    pub async fn state_of(&self, id: ConnectionId) -> Option<ConnectionState> {
        let state = self.state.lock().await;
        state.connections.get(&id).map(Connection::state)
    }

    pub async fn is_queued(&self, id: ConnectionId) -> bool {
        self.state.lock().await.queue.contains(&id)
    }

    /// Queued ids, head first.
    pub async fn queued(&self) -> Vec<ConnectionId> {
        self.state.lock().await.queue.ids()
    }

    /// Terminate every transport and clear all state. Returns how many
    /// connections were dropped.
    pub async fn shutdown(&self) -> usize {
        let mut state = self.state.lock().await;
        let RelayState { connections, queue } = &mut *state;
        let count = connections.len();
        for (_, conn) in connections.drain() {
            conn.terminate();
        }
        queue.retain(|_| false);
        tracing::info!(connections = count, reason = %DisconnectReason::Shutdown, "relay drained");
        count
    }
}

impl Default for RelayController {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayState {
    fn send_to(&self, id: ConnectionId, event: &PeerEvent) -> Result<(), DeliveryError> {
        let conn = self.connections.get(&id).ok_or(DeliveryError::Closed)?;
        conn.send(event)?;
        tracing::debug!(connection_id = %id, event = event.kind(), "event sent");
        Ok(())
    }

    /// Pair `id` with the head of the queue, or queue it.
    ///
    /// The candidate is told first. If it cannot be reached it is discarded
    /// and the next candidate is tried; `id` has seen nothing yet. If `id`
    /// itself cannot be reached, `id` is discarded and the candidate's match
    /// is retracted. Links are set only once both sides were told.
    fn pair_or_enqueue(&mut self, id: ConnectionId) {
        loop {
            let connections = &self.connections;
            let candidate = self.queue.dequeue_candidate(|cid| {
                *cid != id && connections.get(cid).is_some_and(Connection::is_pairable)
            });

            let Some(candidate) = candidate else {
                self.queue.enqueue(id);
                tracing::debug!(connection_id = %id, queue_len = self.queue.len(), "queued");
                return;
            };

            if let Err(err) = self.send_to(candidate, &PeerEvent::Matched { initiator: true }) {
                tracing::warn!(
                    connection_id = %candidate,
                    error = %err,
                    "candidate unreachable, trying next"
                );
                self.discard(candidate, DisconnectReason::DeliveryFailed);
                continue;
            }

            if let Err(err) = self.send_to(id, &PeerEvent::Matched { initiator: false }) {
                tracing::warn!(
                    connection_id = %id,
                    partner_id = %candidate,
                    error = %err,
                    "match rolled back"
                );
                self.discard(id, DisconnectReason::DeliveryFailed);
                self.retract_match(candidate);
                return;
            }

            self.link(candidate, id);
            return;
        }
    }

    /// Undo a `match` already sent to `candidate` whose partner never got
    /// its own. The candidate hears `partner_disconnected` and returns to the
    /// queue head, or is discarded if even that cannot be delivered.
    fn retract_match(&mut self, candidate: ConnectionId) {
        match self.send_to(candidate, &PeerEvent::PartnerDisconnected) {
            Ok(()) => {
                self.queue.requeue_front(candidate);
            }
            Err(err) => {
                tracing::warn!(connection_id = %candidate, error = %err, "match retraction failed");
                self.discard(candidate, DisconnectReason::DeliveryFailed);
            }
        }
    }

    fn link(&mut self, initiator: ConnectionId, responder: ConnectionId) {
        for (this, other) in [(initiator, responder), (responder, initiator)] {
            if let Some(conn) = self.connections.get_mut(&this) {
                conn.link(other);
                if let Err(err) = conn.transition_to(ConnectionState::Matched) {
                    tracing::error!(connection_id = %this, error = %err, "bad transition on match");
                }
            }
        }
        tracing::info!(connection_id = %responder, partner_id = %initiator, "session started");
    }

    /// Shared teardown: notify and unlink the partner, leave the queue and
    /// close. Returns false if the connection was unknown or already closed.
    fn teardown(&mut self, id: ConnectionId, reason: DisconnectReason) -> bool {
        let Some(conn) = self.connections.get_mut(&id) else {
            return false;
        };
        if conn.state() == ConnectionState::Closed {
            return false;
        }

        let partner = conn.take_partner();
        if let Err(err) = conn.transition_to(ConnectionState::Closed) {
            tracing::error!(connection_id = %id, error = %err, "bad transition on teardown");
        }
        self.queue.remove(&id);

        if let Some(pid) = partner {
            if let Some(other) = self.connections.get_mut(&pid) {
                if other.unlink_from(id) {
                    match other.send(&PeerEvent::PartnerDisconnected) {
                        Ok(()) => {
                            tracing::debug!(connection_id = %pid, "partner_disconnected sent");
                        }
                        Err(err) => {
                            tracing::debug!(connection_id = %pid, error = %err, "partner not notified");
                        }
                    }
                }
            }
        }

        tracing::info!(connection_id = %id, reason = %reason, "connection closed");
        true
    }

    /// Teardown, terminate the transport and forget the entry.
    fn discard(&mut self, id: ConnectionId, reason: DisconnectReason) -> bool {
        self.teardown(id, reason);
        match self.connections.remove(&id) {
            Some(conn) => {
                conn.terminate();
                tracing::debug!(connection_id = %id, remaining = self.connections.len(), "connection forgotten");
                true
            }
            None => false,
        }
    }
}
