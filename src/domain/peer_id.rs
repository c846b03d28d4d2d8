//! Type-safe peer identifier.
//!
//! [`PeerId`] is a newtype wrapper around [`uuid::Uuid`] (v4). A fresh one
//! is minted for every accepted connection; a client that reconnects gets a
//! brand-new identity rather than resuming a prior one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for one connected peer.
///
/// Wraps a UUID v4. Generated at connect time and immutable for the
/// lifetime of the connection. Used as the dictionary key in
/// [`super::PeerRegistry`] and as the structured logging field for
/// connection lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(uuid::Uuid);

impl PeerId {
    /// Creates a new random `PeerId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `PeerId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
