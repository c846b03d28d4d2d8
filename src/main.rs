//! chat-relay server entry point.
//!
//! Starts the Axum server with the WebSocket relay endpoint and the
//! operator health check.

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use chat_relay::api;
use chat_relay::app_state::AppState;
use chat_relay::config::RelayConfig;
use chat_relay::domain::PeerRegistry;
use chat_relay::error::RelayError;
use chat_relay::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = RelayConfig::from_env();
    tracing::info!(addr = %config.listen_addr, origin = %config.allowed_origin, "starting chat-relay");

    let allowed_origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| RelayError::InvalidConfig(format!("FRONTEND_URL: {e}")))?;

    // Build application state
    let app_state = AppState {
        registry: Arc::new(PeerRegistry::new()),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = Router::new()
        .merge(api::routes())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(allowed_origin)
                .allow_methods([Method::GET, Method::POST]),
        )
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .map_err(|source| RelayError::Bind {
            addr: config.listen_addr,
            source,
        })?;
    tracing::info!(addr = %config.listen_addr, "relay listening");

    axum::serve(listener, app).await?;

    Ok(())
}
