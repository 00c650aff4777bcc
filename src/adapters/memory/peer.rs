//! In-memory peer sink.
//!
//! Records every delivered event as its JSON text so tests can assert on the
//! exact frames a client would have received.
//!
//! # Example
//!
//! ```ignore
//! let peer = Arc::new(InMemoryPeer::new());
//! let id = controller.connect(peer.clone()).await;
//! assert_eq!(peer.sent_types(), vec!["waiting"]);
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::relay::PeerEvent;
use crate::ports::{DeliveryError, PeerSink};

/// Peer sink that stores frames instead of writing to a socket.
#[derive(Debug)]
pub struct InMemoryPeer {
    sent: Mutex<Vec<String>>,
    probes: AtomicUsize,
    open: AtomicBool,
    terminated: AtomicBool,
    backpressure: AtomicBool,
}

impl InMemoryPeer {
    /// Creates an open peer.
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            probes: AtomicUsize::new(0),
            open: AtomicBool::new(true),
            terminated: AtomicBool::new(false),
            backpressure: AtomicBool::new(false),
        }
    }

    /// Frames delivered so far, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.frames().clone()
    }

    /// The `type` member of every delivered frame.
    pub fn sent_types(&self) -> Vec<String> {
        self.frames()
            .iter()
            .filter_map(|frame| {
                serde_json::from_str::<serde_json::Value>(frame)
                    .ok()
                    .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string))
            })
            .collect()
    }

    /// How many frames of the given type were delivered.
    pub fn count_of(&self, kind: &str) -> usize {
        self.sent_types().iter().filter(|t| t.as_str() == kind).count()
    }

    /// Number of liveness probes issued.
    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Simulate the remote side dropping the transport.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    /// Make every delivery fail with `Backpressure` while leaving the
    /// transport open.
    pub fn set_backpressure(&self, on: bool) {
        self.backpressure.store(on, Ordering::SeqCst);
    }

    /// Returns true once `terminate` has been called.
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    fn frames(&self) -> MutexGuard<'_, Vec<String>> {
        self.sent.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for InMemoryPeer {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerSink for InMemoryPeer {
    fn deliver(&self, event: &PeerEvent) -> Result<(), DeliveryError> {
        if !self.is_open() {
            return Err(DeliveryError::Closed);
        }
        if self.backpressure.load(Ordering::SeqCst) {
            return Err(DeliveryError::Backpressure);
        }
        let frame = event
            .to_json()
            .map_err(|e| DeliveryError::Encode(e.to_string()))?;
        self.frames().push(frame);
        Ok(())
    }

    fn probe(&self) -> Result<(), DeliveryError> {
        if !self.is_open() {
            return Err(DeliveryError::Closed);
        }
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn terminate(&self) {
        self.terminated.store(true, Ordering::SeqCst);
        self.open.store(false, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}
