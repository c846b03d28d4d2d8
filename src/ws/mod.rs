//! WebSocket layer: upgrade handling, per-connection loop, wire events.
//!
//! The WebSocket endpoint at `/ws` is the relay's only client-facing
//! surface: each accepted upgrade becomes one peer whose published
//! messages are fanned out to the full peer set.

pub mod connection;
pub mod handler;
pub mod messages;
