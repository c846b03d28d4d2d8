//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::domain::PeerRegistry;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live set of connected peers.
    pub registry: Arc<PeerRegistry>,
    /// Immutable startup configuration.
    pub config: Arc<RelayConfig>,
}
