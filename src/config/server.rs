//! Server and service identity configuration types.

use serde::Deserialize;

use crate::peer;

/// The four record services. Each binary runs exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Area,
    People,
    Project,
    Ticket,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Area,
        ServiceKind::People,
        ServiceKind::Project,
        ServiceKind::Ticket,
    ];

    /// Logical name other services use to reach this one.
    pub fn peer_name(self) -> &'static str {
        match self {
            ServiceKind::Area => peer::AREA,
            ServiceKind::People => peer::PEOPLE,
            ServiceKind::Project => peer::PROJECT,
            ServiceKind::Ticket => peer::TICKET,
        }
    }

    /// Port the service listens on when none is configured.
    pub fn default_port(self) -> u16 {
        match self {
            ServiceKind::Area => 9091,
            ServiceKind::Project => 9092,
            ServiceKind::Ticket => 9093,
            ServiceKind::People => 9094,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to. Falls back to the service's default port.
    pub port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: None,
        }
    }
}

impl ServerConfig {
    pub fn port_for(&self, kind: ServiceKind) -> u16 {
        self.port.unwrap_or_else(|| kind.default_port())
    }
}
