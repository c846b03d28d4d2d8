//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`), read once before the listener binds
//! and immutable thereafter.

use std::net::SocketAddr;

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address the relay binds to (all interfaces, `WEBSOCKET_PORT`).
    pub listen_addr: SocketAddr,

    /// Origin allowed to complete the upgrade handshake, also used as the
    /// CORS allow-list (`FRONTEND_URL`).
    pub allowed_origin: String,
}

/// Port used when `WEBSOCKET_PORT` is unset or unparsable.
pub const DEFAULT_PORT: u16 = 4000;

/// Origin used when `FRONTEND_URL` is unset.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to the defaults when a variable is not set or cannot be
    /// parsed. Calls `dotenvy::dotenv().ok()` to optionally load a `.env`
    /// file.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let port = parse_env("WEBSOCKET_PORT", DEFAULT_PORT);
        let allowed_origin =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| DEFAULT_ORIGIN.to_string());

        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            allowed_origin,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
