//! Live set of connected peers and the fan-out broadcast over it.
//!
//! [`PeerRegistry`] maps each [`PeerId`] to the outbound channel of its
//! connection task. Connect inserts, disconnect removes, and broadcast
//! iterates a read-locked snapshot — all mutation is serialized through
//! the lock, so a disconnect can never race an in-flight iteration.

use std::collections::HashMap;

use tokio::sync::{RwLock, mpsc};

use super::PeerId;

/// Outbound channel end for one connected peer.
///
/// Frames pushed here are drained by the peer's connection task and written
/// to its WebSocket. When the connection ends, the receiving side is dropped
/// and every later send fails, which the broadcast path treats as a skip.
pub type PeerSender = mpsc::UnboundedSender<String>;

/// Central store for all currently connected peers.
///
/// # Concurrency
///
/// - Insert and remove take the write lock (single writer at a time).
/// - Broadcast iterates under the read lock, a consistent snapshot: peers
///   that connect after the snapshot is taken do not receive the frame.
/// - Sends are non-blocking (`mpsc::UnboundedSender`), so the lock is never
///   held across an await point.
#[derive(Debug)]
pub struct PeerRegistry {
    peers: RwLock<HashMap<PeerId, PeerSender>>,
}

impl PeerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a newly connected peer.
    ///
    /// This step cannot reject a connection; origin gating happens at the
    /// upgrade boundary before a peer is ever created.
    pub async fn insert(&self, peer_id: PeerId, sender: PeerSender) {
        let mut peers = self.peers.write().await;
        peers.insert(peer_id, sender);
        tracing::info!(%peer_id, peers = peers.len(), "peer connected");
    }

    /// Removes a disconnected peer, returning `true` if it was present.
    ///
    /// Idempotent: removing an identifier that is already absent is a no-op.
    pub async fn remove(&self, peer_id: PeerId) -> bool {
        let mut peers = self.peers.write().await;
        let removed = peers.remove(&peer_id).is_some();
        if removed {
            tracing::info!(%peer_id, peers = peers.len(), "peer disconnected");
        }
        removed
    }

    /// Queues `frame` for every currently connected peer, the originator
    /// included, and returns the number of peers it was delivered to.
    ///
    /// Best-effort: a peer whose connection task has already gone away is
    /// skipped and the broadcast continues for the remaining peers. The
    /// stale entry is reaped by that peer's own disconnect path.
    pub async fn broadcast(&self, frame: &str) -> usize {
        let peers = self.peers.read().await;
        let mut delivered = 0;
        for (peer_id, sender) in peers.iter() {
            if sender.send(frame.to_string()).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!(%peer_id, "skipping closed peer channel");
            }
        }
        delivered
    }

    /// Returns the number of connected peers.
    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Returns `true` if no peers are connected.
    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
