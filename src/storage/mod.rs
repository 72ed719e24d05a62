//! Record persistence.
//!
//! Each service owns exactly one table. [`RecordStore`] is the contract the
//! service layer codes against; the SQLite store is the production
//! implementation and the in-memory store backs unit tests.

use async_trait::async_trait;

use crate::model::{CountMap, Record, RecordId};

pub mod mock;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use mock::InMemoryRecordStore;
#[cfg(feature = "sqlite")]
pub use sqlite::{connect, SqlRecord, SqliteRecordStore};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Query build error: {0}")]
    Query(String),

    #[error("Corrupt {kind} row: {reason}")]
    Corrupt { kind: &'static str, reason: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to prepare storage directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistence for one record kind.
#[async_trait]
pub trait RecordStore<E: Record>: Send + Sync + 'static {
    /// Create the backing table if it does not exist.
    async fn init_schema(&self) -> Result<()>;

    async fn find_by_id(&self, id: RecordId) -> Result<Option<E>>;

    /// All records, ascending by id.
    async fn find_all(&self) -> Result<Vec<E>>;

    /// Records matching an equality filter, ascending by id.
    async fn find_matching(&self, filter: &E::Filter) -> Result<Vec<E>>;

    /// Insert when the record has no id, upsert otherwise.
    ///
    /// Returns the record as stored, id populated.
    async fn save(&self, record: E) -> Result<E>;

    /// Returns whether a row was removed.
    async fn delete_by_id(&self, id: RecordId) -> Result<bool>;

    /// Number of rows per distinct value of a foreign-key column.
    async fn count_grouped_by(&self, key: E::ForeignKey) -> Result<CountMap>;
}
