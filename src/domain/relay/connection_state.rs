//! ConnectionState enum for the per-connection relay lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle state of one relay connection.
///
/// ```text
/// Waiting ──► Matched ──► Closed
///    └──────────────────────▲
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Queued for a partner.
    #[default]
    Waiting,
    /// Paired into a session. The partner link may already be cleared if the
    /// other side left first.
    Matched,
    /// Torn down. Terminal.
    Closed,
}

impl ConnectionState {
    /// Returns true while the connection can still take part in a session.
    pub fn is_live(&self) -> bool {
        !matches!(self, ConnectionState::Closed)
    }
}

impl StateMachine for ConnectionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConnectionState::*;
        matches!(
            (self, target),
            (Waiting, Matched) | (Waiting, Closed) | (Matched, Closed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionState::*;
        match self {
            Waiting => vec![Matched, Closed],
            Matched => vec![Closed],
            Closed => vec![],
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Waiting => "waiting",
            ConnectionState::Matched => "matched",
            ConnectionState::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}
