//! Options handed through to the session-storing node.
//!
//! The admission layer never interprets these values; it only picks them
//! per request and passes them along.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic position of a client, used by nodes to place new sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Options for creating a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateSessionOptions {
    /// Position of the client that opened the session.
    pub client_geo_coordinates: Option<GeoCoordinates>,
    /// When the node may evict the session. `None` leaves it to the node.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateSessionOptions {
    pub fn with_client_geo_coordinates(mut self, coordinates: GeoCoordinates) -> Self {
        self.client_geo_coordinates = Some(coordinates);
        self
    }

    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// Options for acquiring an existing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquireSessionOptions {
    /// Whether the node may offload the session once the request finishes.
    pub allow_offloading: bool,
    /// Whether the request may run while an offload is being prepared.
    pub allow_while_offloading: bool,
}

impl Default for AcquireSessionOptions {
    fn default() -> Self {
        Self {
            allow_offloading: true,
            allow_while_offloading: true,
        }
    }
}

/// Options for the combined create-then-acquire call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateAndAcquireSessionOptions {
    pub create: CreateSessionOptions,
    pub acquire: AcquireSessionOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_defaults_allow_offloading() {
        let options = AcquireSessionOptions::default();
        assert!(options.allow_offloading);
        assert!(options.allow_while_offloading);
    }

    #[test]
    fn create_defaults_leave_everything_to_the_node() {
        let options = CreateSessionOptions::default();
        assert!(options.client_geo_coordinates.is_none());
        assert!(options.expires_at.is_none());
    }
}
