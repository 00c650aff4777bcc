//! Signal Relay - Rendezvous and WebRTC signaling relay
//!
//! Pairs anonymous clients in arrival order and relays session-negotiation
//! payloads between the two sides of each pair until one of them leaves.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
