//! Per-connection read/write loop.
//!
//! One task per peer: reads inbound frames and hands `send_message` events
//! to the registry for fan-out, while draining the peer's outbound queue
//! into the socket. Every exit path runs the same cleanup.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::messages::{ClientEvent, ServerEvent};
use crate::domain::{PeerId, PeerRegistry};

/// Runs the read/write loop for a single WebSocket connection.
///
/// Registers the peer on entry and removes it on exit — whether the client
/// closed, the transport failed, or the peer violated the protocol. Removal
/// is what cancels all future sends to this peer; frames still queued at
/// that point are dropped, not drained.
pub async fn run_connection(socket: WebSocket, peer_id: PeerId, registry: Arc<PeerRegistry>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (sender, mut outbound) = mpsc::unbounded_channel();
    registry.insert(peer_id, sender).await;

    loop {
        tokio::select! {
            // Inbound frame from this peer
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match relay_frame(&text) {
                            Some(frame) => {
                                let delivered = registry.broadcast(&frame).await;
                                tracing::debug!(%peer_id, delivered, "message fanned out");
                            }
                            None => {
                                // Protocol violation: implicit disconnect
                                tracing::warn!(%peer_id, "malformed frame, closing connection");
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::warn!(%peer_id, error = %err, "websocket transport error");
                        break;
                    }
                    // Ping/Pong are answered by the protocol layer
                    Some(Ok(_)) => {}
                }
            }
            // Broadcast frame queued for this peer
            frame = outbound.recv() => {
                match frame {
                    Some(frame) => {
                        if ws_tx.send(Message::text(frame)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    registry.remove(peer_id).await;
}

/// Parses one inbound text frame and returns the serialized outbound frame
/// to fan out, or `None` if the frame is not valid relay protocol.
fn relay_frame(text: &str) -> Option<String> {
    let ClientEvent::SendMessage(payload) = serde_json::from_str(text).ok()?;
    serde_json::to_string(&ServerEvent::ReceiveMessage(payload)).ok()
}
