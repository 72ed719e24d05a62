//! SQLite implementation of [`RecordStore`].
//!
//! One generic store serves every record kind. Each kind describes its table
//! through [`SqlRecord`]; queries are built with sea-query and executed
//! through sqlx.

use std::marker::PhantomData;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sea_query::{Expr, Iden, OnConflict, Order, Query, SimpleExpr, SqliteQueryBuilder};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use super::{RecordStore, Result, StorageError};
use crate::config::{ServiceKind, StorageConfig, MEMORY_PATH};
use crate::model::{CountMap, Record, RecordId};

mod records;


/// Table description for a record kind stored in SQLite.
pub trait SqlRecord: Record + Sized {
    /// sea-query identifier enum for the table and its columns.
    type Column: Iden + Copy + Send + Sync + 'static;

    const TABLE: Self::Column;
    const ID: Self::Column;
    const CREATE_TABLE: &'static str;

    /// Every column except the id, in the order `data_values` produces.
    fn data_columns() -> Vec<Self::Column>;

    fn data_values(&self) -> Vec<SimpleExpr>;

    fn from_row(row: &SqliteRow) -> Result<Self>;

    fn key_column(key: Self::ForeignKey) -> Self::Column;

    fn filter_expr(filter: &Self::Filter) -> SimpleExpr;
}

/// SQLite-backed record store.
pub struct SqliteRecordStore<E> {
    pool: SqlitePool,
    _record: PhantomData<fn() -> E>,
}

impl<E: SqlRecord> SqliteRecordStore<E> {
    /// Create a new SQLite record store.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    // sea-query statements are not Send; render them to SQL before any await.
    fn insert_sql(record: &E) -> Result<String> {
        Ok(Query::insert()
            .into_table(E::TABLE)
            .columns(E::data_columns())
            .values(record.data_values())
            .map_err(|e| StorageError::Query(e.to_string()))?
            .to_string(SqliteQueryBuilder))
    }

    fn upsert_sql(id: RecordId, record: &E) -> Result<String> {
        let mut columns = vec![E::ID];
        columns.extend(E::data_columns());
        let mut values: Vec<SimpleExpr> = vec![id.into()];
        values.extend(record.data_values());

        Ok(Query::insert()
            .into_table(E::TABLE)
            .columns(columns)
            .values(values)
            .map_err(|e| StorageError::Query(e.to_string()))?
            .on_conflict(
                OnConflict::column(E::ID)
                    .update_columns(E::data_columns())
                    .to_owned(),
            )
            .to_string(SqliteQueryBuilder))
    }

    fn select_all() -> sea_query::SelectStatement {
        let mut columns = vec![E::ID];
        columns.extend(E::data_columns());
        Query::select()
            .columns(columns)
            .from(E::TABLE)
            .order_by(E::ID, Order::Asc)
            .to_owned()
    }

    async fn fetch(&self, sql: &str) -> Result<Vec<E>> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(E::from_row).collect()
    }
}

#[async_trait]
impl<E: SqlRecord> RecordStore<E> for SqliteRecordStore<E> {
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(E::CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<E>> {
        let query = Self::select_all()
            .and_where(Expr::col(E::ID).eq(id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;
        row.as_ref().map(E::from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<E>> {
        let query = Self::select_all().to_string(SqliteQueryBuilder);
        self.fetch(&query).await
    }

    async fn find_matching(&self, filter: &E::Filter) -> Result<Vec<E>> {
        let query = Self::select_all()
            .and_where(E::filter_expr(filter))
            .to_string(SqliteQueryBuilder);
        self.fetch(&query).await
    }

    async fn save(&self, record: E) -> Result<E> {
        match record.id() {
            None => {
                let query = Self::insert_sql(&record)?;
                let result = sqlx::query(&query).execute(&self.pool).await?;
                let id = result.last_insert_rowid();
                debug!(kind = E::KIND, id, "Inserted record");
                Ok(record.with_id(id))
            }
            Some(id) => {
                let query = Self::upsert_sql(id, &record)?;
                sqlx::query(&query).execute(&self.pool).await?;
                debug!(kind = E::KIND, id, "Upserted record");
                Ok(record)
            }
        }
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<bool> {
        let query = Query::delete()
            .from_table(E::TABLE)
            .and_where(Expr::col(E::ID).eq(id))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_grouped_by(&self, key: E::ForeignKey) -> Result<CountMap> {
        let query = {
            let column = E::key_column(key);
            Query::select()
                .column(column)
                .expr(Expr::col(E::ID).count())
                .from(E::TABLE)
                .group_by_col(column)
                .to_string(SqliteQueryBuilder)
        };

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        let mut counts = CountMap::with_capacity(rows.len());
        for row in &rows {
            let key: i64 = row.try_get(0)?;
            let count: i64 = row.try_get(1)?;
            counts.insert(key, count.max(0) as u64);
        }
        Ok(counts)
    }
}

/// Open a pool for one service's storage.
///
/// `:memory:` yields a single-connection pool that is never recycled, so the
/// database lives as long as the pool.
pub async fn connect(config: &StorageConfig, kind: ServiceKind) -> Result<SqlitePool> {
    let path = config.path_for(kind);
    info!(storage = ?config.storage_type, path = %path, "Opening storage");

    if path == MEMORY_PATH {
        let opts = SqliteConnectOptions::new().filename(MEMORY_PATH);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;
        return Ok(pool);
    }

    if let Some(parent) = Path::new(&path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let opts = SqliteConnectOptions::new()
        .filename(&path)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(30))
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    Ok(pool)
}
