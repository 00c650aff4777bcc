//! Relay wire protocol.
//!
//! Every frame is a JSON object discriminated by `type`:
//! - Server → Client: `waiting`, `match`, `signal`, `partner_disconnected`
//! - Client → Server: `signal`, `leave`
//!
//! The `data` member of a `signal` is held as raw JSON text and written back
//! out byte for byte. The relay never looks inside it.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

// ============================================
// Server → Client
// ============================================

/// Notification pushed to one connection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PeerEvent {
    /// Connection accepted and queued.
    Waiting,

    /// Paired with a partner. The initiator generates the offer.
    #[serde(rename = "match")]
    Matched { initiator: bool },

    /// Negotiation payload from the partner.
    Signal { data: Box<RawValue> },

    /// The partner left, closed or was reaped.
    PartnerDisconnected,
}

impl PeerEvent {
    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Short name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            PeerEvent::Waiting => "waiting",
            PeerEvent::Matched { .. } => "match",
            PeerEvent::Signal { .. } => "signal",
            PeerEvent::PartnerDisconnected => "partner_disconnected",
        }
    }
}

// ============================================
// Client → Server
// ============================================

/// Command received from a connection.
#[derive(Debug, Clone)]
pub enum PeerCommand {
    /// Forward `data` to the partner.
    Signal { data: Box<RawValue> },

    /// End the session.
    Leave,
}

/// Why an inbound frame was rejected.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not a JSON command object: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown command type '{0}'")]
    UnknownType(String),

    #[error("signal command without data")]
    MissingData,
}

// Internally tagged enums buffer their content, which RawValue cannot
// survive, so commands are read through a flat envelope instead.
#[derive(Deserialize)]
struct CommandEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, deserialize_with = "present_raw")]
    data: Option<Box<RawValue>>,
}

// A plain `Option<Box<RawValue>>` reads `null` as absent. Capture it raw so
// `"data": null` is relayed like any other payload; only a missing member
// is rejected.
fn present_raw<'de, D>(deserializer: D) -> Result<Option<Box<RawValue>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

impl PeerCommand {
    /// Decode a text frame.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let envelope: CommandEnvelope = serde_json::from_str(text)?;
        match envelope.kind.as_str() {
            "signal" => envelope
                .data
                .map(|data| PeerCommand::Signal { data })
                .ok_or(DecodeError::MissingData),
            "leave" => Ok(PeerCommand::Leave),
            _ => Err(DecodeError::UnknownType(envelope.kind)),
        }
    }
}
