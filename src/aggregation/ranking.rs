//! Two-phase ranking: obtain a count map, then resolve each key to a record.
//!
//! Keys are ordered by count descending, ties by key ascending. Resolution
//! runs as a bounded stream whose output order matches the sorted keys. The
//! whole call, count phase included, runs under one deadline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::FanoutLimits;
use crate::model::{CountMap, Record, RecordId};
use crate::peer::{PeerClient, PeerError};
use crate::storage::{RecordStore, StorageError};

/// Failure of a single count or lookup call.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    Peer(#[from] PeerError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LookupError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LookupError::Peer(e) if e.is_timeout())
    }
}

/// Supplies the count map for the first phase.
#[async_trait]
pub trait CountSource: Send + Sync {
    async fn counts(&self) -> Result<CountMap, LookupError>;
}

/// Resolves a key to its record. `Ok(None)` means the key has no record.
#[async_trait]
pub trait KeyResolver<E>: Send + Sync {
    async fn resolve(&self, key: RecordId) -> Result<Option<E>, LookupError>;
}

/// Counts from a local grouped query.
pub struct StoreCounts<E: Record> {
    store: Arc<dyn RecordStore<E>>,
    key: E::ForeignKey,
}

impl<E: Record> StoreCounts<E> {
    pub fn new(store: Arc<dyn RecordStore<E>>, key: E::ForeignKey) -> Self {
        Self { store, key }
    }
}

#[async_trait]
impl<E: Record> CountSource for StoreCounts<E> {
    async fn counts(&self) -> Result<CountMap, LookupError> {
        Ok(self.store.count_grouped_by(self.key).await?)
    }
}

/// Counts from a peer's count endpoint.
pub struct PeerCounts {
    peers: PeerClient,
    peer: &'static str,
    path: String,
}

impl PeerCounts {
    pub fn new(peers: PeerClient, peer: &'static str, path: impl Into<String>) -> Self {
        Self {
            peers,
            peer,
            path: path.into(),
        }
    }
}

#[async_trait]
impl CountSource for PeerCounts {
    async fn counts(&self) -> Result<CountMap, LookupError> {
        Ok(self.peers.fetch_counts(self.peer, &self.path).await?)
    }
}

/// Resolves keys by point lookup in a local store.
pub struct StoreResolver<E: Record> {
    store: Arc<dyn RecordStore<E>>,
}

impl<E: Record> StoreResolver<E> {
    pub fn new(store: Arc<dyn RecordStore<E>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<E: Record> KeyResolver<E> for StoreResolver<E> {
    async fn resolve(&self, key: RecordId) -> Result<Option<E>, LookupError> {
        Ok(self.store.find_by_id(key).await?)
    }
}

/// Resolves keys by `GET {collection}/{key}` on a peer. A 404 is `Ok(None)`.
pub struct PeerResolver {
    peers: PeerClient,
    peer: &'static str,
    collection: String,
}

impl PeerResolver {
    pub fn new(peers: PeerClient, peer: &'static str, collection: impl Into<String>) -> Self {
        Self {
            peers,
            peer,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl<E: Record> KeyResolver<E> for PeerResolver {
    async fn resolve(&self, key: RecordId) -> Result<Option<E>, LookupError> {
        let path = format!("{}/{}", self.collection, key);
        match self.peers.fetch_one(self.peer, &path).await {
            Ok(record) => Ok(Some(record)),
            Err(PeerError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// What to do when a key fails to resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Any failure fails the whole ranking.
    #[default]
    FailFast,
    /// Return what resolved, plus the keys that did not.
    Degraded,
}

/// Errors from [`RankingAggregator::rank`].
#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("failed to obtain counts: {0}")]
    Count(#[source] LookupError),

    #[error("failed to resolve key {key}: {source}")]
    Resolve {
        key: RecordId,
        #[source]
        source: LookupError,
    },

    #[error("key {0} did not resolve to a record")]
    Unresolved(RecordId),

    #[error("ranking exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl RankingError {
    /// Whether the failure was caused by running out of time.
    pub fn is_timeout(&self) -> bool {
        match self {
            RankingError::DeadlineExceeded(_) => true,
            RankingError::Count(source) | RankingError::Resolve { source, .. } => {
                source.is_timeout()
            }
            RankingError::Unresolved(_) => false,
        }
    }
}

/// A resolved record and its count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry<E> {
    #[serde(flatten)]
    pub record: E,
    pub count: u64,
}

/// A key that could not be resolved under [`FailurePolicy::Degraded`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedKey {
    pub key: RecordId,
    pub count: u64,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking<E> {
    pub entries: Vec<RankedEntry<E>>,
    pub failed: Vec<FailedKey>,
}

impl<E> Ranking<E> {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Records in rank order, counts dropped.
    pub fn into_records(self) -> Vec<E> {
        self.entries.into_iter().map(|entry| entry.record).collect()
    }
}

/// Sort a count map by count descending, then key ascending.
pub fn rank_keys(counts: CountMap) -> Vec<(RecordId, u64)> {
    let mut ranked: Vec<(RecordId, u64)> = counts.into_iter().collect();
    ranked.sort_unstable_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then(ka.cmp(kb)));
    ranked
}

/// Runs rankings with bounded concurrency under an overall deadline.
#[derive(Debug, Clone)]
pub struct RankingAggregator {
    concurrency: usize,
    deadline: Duration,
}

impl RankingAggregator {
    pub fn new(concurrency: usize, deadline: Duration) -> Self {
        Self {
            concurrency: concurrency.max(1),
            deadline,
        }
    }

    pub fn from_limits(limits: &FanoutLimits) -> Self {
        Self::new(limits.concurrency(), limits.request_deadline())
    }

    pub async fn rank<E: Record>(
        &self,
        source: &dyn CountSource,
        resolver: &dyn KeyResolver<E>,
        policy: FailurePolicy,
    ) -> Result<Ranking<E>, RankingError> {
        match tokio::time::timeout(self.deadline, self.run(source, resolver, policy)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(kind = E::KIND, deadline = ?self.deadline, "Ranking exceeded deadline");
                Err(RankingError::DeadlineExceeded(self.deadline))
            }
        }
    }

    async fn run<E: Record>(
        &self,
        source: &dyn CountSource,
        resolver: &dyn KeyResolver<E>,
        policy: FailurePolicy,
    ) -> Result<Ranking<E>, RankingError> {
        let counts = source.counts().await.map_err(RankingError::Count)?;
        let ranked = rank_keys(counts);
        let mut ranking = Ranking::empty();
        if ranked.is_empty() {
            return Ok(ranking);
        }

        let keys = ranked.len();
        let mut lookups = stream::iter(ranked)
            .map(|(key, count)| async move { (key, count, resolver.resolve(key).await) })
            .buffered(self.concurrency);

        // Returning early drops the stream and cancels in-flight lookups.
        while let Some((key, count, outcome)) = lookups.next().await {
            let error = match outcome {
                Ok(Some(record)) => {
                    ranking.entries.push(RankedEntry { record, count });
                    continue;
                }
                Ok(None) if policy == FailurePolicy::FailFast => {
                    return Err(RankingError::Unresolved(key));
                }
                Err(source) if policy == FailurePolicy::FailFast => {
                    return Err(RankingError::Resolve { key, source });
                }
                Ok(None) => format!("{} {} not found", E::KIND, key),
                Err(source) => source.to_string(),
            };
            warn!(kind = E::KIND, key, error = %error, "Ranking key unresolved");
            ranking.failed.push(FailedKey { key, count, error });
        }

        info!(
            kind = E::KIND,
            keys,
            resolved = ranking.entries.len(),
            failed = ranking.failed.len(),
            "Ranking complete"
        );
        Ok(ranking)
    }
}

#[cfg(test)]
mod tests;
