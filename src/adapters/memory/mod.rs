//! In-memory adapters for tests and local experiments.

mod peer;

pub use peer::InMemoryPeer;
