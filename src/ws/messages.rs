//! Wire-level events exchanged over a relay connection.
//!
//! Frames are JSON text with an `event` discriminator and an opaque `data`
//! payload the relay never interprets:
//!
//! ```json
//! {"event": "send_message", "data": {"text": "hi"}}
//! {"event": "receive_message", "data": {"text": "hi"}}
//! ```

use serde::{Deserialize, Serialize};

/// Client → server event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Publish a payload to every connected peer.
    SendMessage(serde_json::Value),
}

/// Server → client event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A payload published by some peer, fanned out to the full peer set
    /// (the sender included).
    ReceiveMessage(serde_json::Value),
}
