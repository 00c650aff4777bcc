//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `websocket` - Relay connections over WebSocket (`PeerSink`)
//! - `memory` - In-memory `PeerSink` for tests and embedding
//! - `identity` - Telegram Mini App `IdentityResolver`
//! - `http` - REST endpoints and the assembled router

pub mod http;
pub mod identity;
pub mod memory;
pub mod websocket;

pub use http::{app_router, AppState};
pub use identity::TelegramIdentityResolver;
pub use memory::InMemoryPeer;
pub use websocket::WebSocketPeer;
