//! In-memory record store for testing.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecordStore, Result, StorageError};
use crate::model::{CountMap, Record, RecordId};

/// Record store that keeps rows in a map, ordered by id.
pub struct InMemoryRecordStore<E> {
    rows: RwLock<BTreeMap<RecordId, E>>,
    fail: RwLock<bool>,
}

impl<E: Record> Default for InMemoryRecordStore<E> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            fail: RwLock::new(false),
        }
    }
}

impl<E: Record> InMemoryRecordStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with records; those without an id get the next free one.
    pub async fn seeded(records: impl IntoIterator<Item = E>) -> Self {
        let store = Self::new();
        for record in records {
            let _ = store.save(record).await;
        }
        store
    }

    /// Make every subsequent call fail with `StorageError::Unavailable`.
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    async fn check(&self) -> Result<()> {
        if *self.fail.read().await {
            return Err(StorageError::Unavailable(format!(
                "{} store configured to fail",
                E::KIND
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Record> RecordStore<E> for InMemoryRecordStore<E> {
    async fn init_schema(&self) -> Result<()> {
        self.check().await
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<E>> {
        self.check().await?;
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<E>> {
        self.check().await?;
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn find_matching(&self, filter: &E::Filter) -> Result<Vec<E>> {
        self.check().await?;
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|record| record.matches(filter))
            .cloned()
            .collect())
    }

    async fn save(&self, record: E) -> Result<E> {
        self.check().await?;
        let mut rows = self.rows.write().await;
        let id = match record.id() {
            Some(id) => id,
            None => rows.keys().next_back().map_or(1, |last| last + 1),
        };
        let record = record.with_id(id);
        rows.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<bool> {
        self.check().await?;
        Ok(self.rows.write().await.remove(&id).is_some())
    }

    async fn count_grouped_by(&self, key: E::ForeignKey) -> Result<CountMap> {
        self.check().await?;
        let mut counts = CountMap::new();
        for record in self.rows.read().await.values() {
            *counts.entry(record.foreign_key(key)).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
