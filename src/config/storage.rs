//! Storage configuration types.

use serde::Deserialize;

use super::ServiceKind;

/// Path value selecting a private in-memory SQLite database.
pub const MEMORY_PATH: &str = ":memory:";

/// Storage type discriminator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Sqlite,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage type discriminator.
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    /// Database file path. Defaults to `./data/<service>.db`.
    pub path: Option<String>,
}

impl StorageConfig {
    pub fn path_for(&self, kind: ServiceKind) -> String {
        self.path
            .clone()
            .unwrap_or_else(|| format!("./data/{}.db", kind.peer_name()))
    }
}
