//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod limits;
mod peers;
mod server;
mod storage;

pub use limits::{
    FanoutLimits, DEFAULT_CALL_TIMEOUT_MS, DEFAULT_FANOUT_CONCURRENCY, DEFAULT_REQUEST_DEADLINE_MS,
};
pub use peers::PeerEndpoint;
pub use server::{ServerConfig, ServiceKind};
pub use storage::{StorageConfig, StorageType, MEMORY_PATH};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "WORKBOARD_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "WORKBOARD";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "WORKBOARD_LOG";
/// Prefix for per-peer base URL overrides (`WORKBOARD_PEER_AREA=http://...`).
pub const PEER_ENV_PREFIX: &str = "WORKBOARD_PEER_";

use serde::Deserialize;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Peer service endpoints, by logical name.
    pub peers: Vec<PeerEndpoint>,
    /// Timeouts and concurrency for cross-service fan-out.
    pub fanout: FanoutLimits,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Create config for testing: in-memory storage, defaults elsewhere.
    pub fn for_test() -> Self {
        Self {
            storage: StorageConfig {
                path: Some(MEMORY_PATH.to_string()),
                ..StorageConfig::default()
            },
            ..Self::default()
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid URL for peer '{name}': {url}")]
    InvalidPeerUrl { name: String, url: String },
}
