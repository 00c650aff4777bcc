//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, the state machine trait and validation errors
//! shared by the relay and identity domains.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{ConnectionId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
