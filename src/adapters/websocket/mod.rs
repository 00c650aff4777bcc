//! WebSocket adapter for relay connections.
//!
//! # Architecture
//!
//! ```text
//!  client ──text/pong──► recv task ──► RelayController
//!                                          │ PeerSink::deliver / probe
//!                                          ▼
//!  client ◄──frames──── writer task ◄── bounded channel (WebSocketPeer)
//! ```
//!
//! # Components
//!
//! - [`peer`] - Non-blocking `PeerSink` over a WebSocket write half
//! - [`handler`] - Axum upgrade handler and per-connection read loop

pub mod handler;
pub mod peer;

pub use handler::{relay_socket_router, ws_handler, RelaySocketState};
pub use peer::WebSocketPeer;
