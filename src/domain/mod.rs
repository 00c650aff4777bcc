//! Domain layer containing relay logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `relay` - Connections, matchmaking queue and the relay controller
//! - `identity` - Mini App init data verification and resolved identities

pub mod foundation;
pub mod identity;
pub mod relay;
