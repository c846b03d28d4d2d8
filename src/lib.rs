//! # chat-relay
//!
//! Real-time WebSocket message relay. Clients hold a persistent
//! bidirectional connection to the server and publish messages; every
//! published message is rebroadcast to all currently connected clients,
//! the sender included. Messages are opaque to the relay — no rooms, no
//! persistence, no delivery guarantee beyond best effort while connected.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket)
//!     │
//!     ├── Upgrade Handler (ws/) — origin gate, peer identity
//!     ├── Connection Loop (ws/) — one task per peer
//!     │
//!     ├── PeerRegistry (domain/) — live peer set, fan-out broadcast
//!     │
//!     └── Health Endpoint (api/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod ws;
