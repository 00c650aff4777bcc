//! WebSocket upgrade handler for relay connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Upgrade with the configured frame size limit
//! 2. Start the writer task and register with the relay
//! 3. Feed inbound text frames and pongs to the relay until disconnect
//! 4. Tear down through the relay exactly once

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::StreamExt;

use crate::config::RelayConfig;
use crate::domain::relay::{DisconnectReason, RelayController};

use super::peer::WebSocketPeer;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct RelaySocketState {
    pub relay: Arc<RelayController>,
    /// Outbound frames buffered per connection before backpressure.
    pub outbound_buffer: usize,
    /// Largest inbound message accepted, in bytes.
    pub max_message_bytes: usize,
}

impl RelaySocketState {
    pub fn new(relay: Arc<RelayController>, config: &RelayConfig) -> Self {
        Self {
            relay,
            outbound_buffer: config.outbound_buffer,
            max_message_bytes: config.max_message_bytes,
        }
    }
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<RelaySocketState>) -> Response {
    ws.max_message_size(state.max_message_bytes)
        .max_frame_size(state.max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one established connection until either half stops.
async fn handle_socket(socket: WebSocket, state: RelaySocketState) {
    let (sender, mut receiver) = socket.split();
    let (peer, mut send_task) = WebSocketPeer::spawn(sender, state.outbound_buffer);

    let id = state.relay.connect(peer).await;

    let relay = state.relay.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => relay.handle_text(id, &text).await,
                Ok(Message::Pong(_)) => relay.acknowledge(id).await,
                Ok(Message::Binary(_)) => {
                    tracing::warn!(connection_id = %id, "Received unsupported binary message");
                }
                Ok(Message::Ping(_)) => {
                    // WebSocket protocol ping - answered automatically by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %id, "Client sent close frame");
                    return DisconnectReason::TransportClosed;
                }
                Err(e) => {
                    tracing::debug!(connection_id = %id, error = %e, "Receive error");
                    return DisconnectReason::TransportError;
                }
            }
        }
        DisconnectReason::TransportClosed
    });

    let reason = tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            DisconnectReason::TransportClosed
        }
        result = &mut recv_task => {
            send_task.abort();
            result.unwrap_or(DisconnectReason::TransportError)
        }
    };

    state.relay.disconnect(id, reason).await;
}

/// Create axum router for the relay WebSocket endpoint.
pub fn relay_socket_router() -> Router<RelaySocketState> {
    Router::new().route("/ws", get(ws_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_state_takes_limits_from_config() {
        let relay = Arc::new(RelayController::new());
        let config = RelayConfig {
            outbound_buffer: 7,
            max_message_bytes: 2048,
            ..RelayConfig::default()
        };
        let state = RelaySocketState::new(relay.clone(), &config);

        assert!(Arc::ptr_eq(&state.relay, &relay));
        assert_eq!(state.outbound_buffer, 7);
        assert_eq!(state.max_message_bytes, 2048);
    }

    #[test]
    fn relay_socket_router_builds() {
        let relay = Arc::new(RelayController::new());
        let state = RelaySocketState::new(relay, &RelayConfig::default());
        let _: Router<()> = relay_socket_router().with_state(state);
    }
}
