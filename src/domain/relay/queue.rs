//! Matchmaking queue.
//!
//! A FIFO of connection ids waiting for a partner. The queue knows nothing
//! about connection state; callers pass a predicate so stale heads can be
//! dropped lazily at dequeue time even if an eager removal was missed.

use std::collections::{HashSet, VecDeque};

use crate::domain::foundation::ConnectionId;

/// Ordered, duplicate-free waiting line.
#[derive(Debug, Default)]
pub struct MatchmakingQueue {
    order: VecDeque<ConnectionId>,
    members: HashSet<ConnectionId>,
}

impl MatchmakingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail. Returns false if already queued.
    pub fn enqueue(&mut self, id: ConnectionId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push_back(id);
        true
    }

    /// Put back at the head, ahead of everyone else. Used when a pairing
    /// attempt is rolled back so the longest waiter keeps its place.
    pub fn requeue_front(&mut self, id: ConnectionId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push_front(id);
        true
    }

    /// Pop heads until one satisfies `is_valid`; invalid heads are dropped.
    pub fn dequeue_candidate<F>(&mut self, mut is_valid: F) -> Option<ConnectionId>
    where
        F: FnMut(&ConnectionId) -> bool,
    {
        while let Some(id) = self.order.pop_front() {
            self.members.remove(&id);
            if is_valid(&id) {
                return Some(id);
            }
            tracing::debug!(connection_id = %id, "dropping stale queue entry");
        }
        None
    }

    /// Remove a specific id. Idempotent.
    pub fn remove(&mut self, id: &ConnectionId) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.order.retain(|queued| queued != id);
        true
    }

    /// Keep only ids matching `keep`. Returns how many were purged.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&ConnectionId) -> bool,
    {
        let before = self.order.len();
        let members = &mut self.members;
        self.order.retain(|id| {
            let kept = keep(id);
            if !kept {
                members.remove(id);
            }
            kept
        });
        before - self.order.len()
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Snapshot of queued ids, head first.
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.order.iter().copied().collect()
    }
}
