//! Bootstrap utilities for the workboard service binaries.
//!
//! Shared startup code: tracing, config path, store and peer client.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, ServiceKind, LOG_ENV_VAR};
use crate::peer::{HttpTransport, PeerClient, PeerDirectory};
#[cfg(feature = "sqlite")]
use crate::storage::{connect, RecordStore, SqlRecord, SqliteRecordStore};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Initialize tracing with the WORKBOARD_LOG environment variable.
///
/// Defaults to "info" level if WORKBOARD_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Config file path from `--config <path>` or `-c <path>`.
pub fn parse_config_path() -> Option<String> {
    config_path_from(std::env::args().skip(1))
}

fn config_path_from(args: impl IntoIterator<Item = String>) -> Option<String> {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            return args.next();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}

/// Open the service's SQLite database and create its table.
#[cfg(feature = "sqlite")]
pub async fn open_store<E: SqlRecord>(
    config: &Config,
    kind: ServiceKind,
) -> Result<Arc<SqliteRecordStore<E>>, BoxError> {
    let pool = connect(&config.storage, kind).await?;
    let store = SqliteRecordStore::<E>::new(pool);
    store.init_schema().await?;
    info!(kind = E::KIND, "Storage ready");
    Ok(Arc::new(store))
}

/// Peer client over HTTP using the configured directory and call timeout.
pub fn peer_client(config: &Config) -> Result<PeerClient, BoxError> {
    let directory = PeerDirectory::from_config(&config.peers)?;
    let call_timeout = config.fanout.call_timeout();
    let transport = HttpTransport::new(directory, call_timeout)?;
    Ok(PeerClient::new(Arc::new(transport), call_timeout))
}
