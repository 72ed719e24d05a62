//! Peer service endpoint configuration.

use serde::Deserialize;

/// A peer service reachable by logical name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PeerEndpoint {
    /// Logical service name (`area`, `people`, `project`, `ticket`).
    pub name: String,
    /// Base URL, e.g. `http://project:9092`.
    pub url: String,
}
