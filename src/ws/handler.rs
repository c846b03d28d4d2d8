//! Axum WebSocket upgrade handler with origin gating.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::domain::PeerId;
use crate::error::RelayError;

/// `GET /ws` — Upgrade HTTP connection to WebSocket.
///
/// A present `Origin` header must match the allow-listed origin from
/// configuration; a rejected request never creates a peer. Requests without
/// an `Origin` header (non-browser clients) are admitted — the allow-list
/// only ever constrains browsers.
///
/// # Errors
///
/// Returns [`RelayError::OriginNotAllowed`] (403) when the request carries
/// an `Origin` that is not allow-listed.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, RelayError> {
    if let Some(origin) = headers.get(header::ORIGIN) {
        let origin = origin.to_str().unwrap_or_default();
        if origin != state.config.allowed_origin {
            tracing::warn!(origin, "rejected upgrade from non-allow-listed origin");
            return Err(RelayError::OriginNotAllowed(origin.to_string()));
        }
    }

    let peer_id = PeerId::new();
    let registry = Arc::clone(&state.registry);

    Ok(ws.on_upgrade(move |socket| run_connection(socket, peer_id, registry)))
}
