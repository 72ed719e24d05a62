use std::collections::HashMap;

use serde_json::json;
use tokio::sync::Mutex;

use super::*;
use crate::model::{Area, Project, ProjectKey};
use crate::peer::{StaticTransport, TransportCause, AREA, PROJECT};
use crate::storage::InMemoryRecordStore;

/// Count source with a fixed map.
struct FixedCounts(CountMap);

#[async_trait]
impl CountSource for FixedCounts {
    async fn counts(&self) -> Result<CountMap, LookupError> {
        Ok(self.0.clone())
    }
}

/// Resolver over a fixed table that records lookup order and can fail keys.
#[derive(Default)]
struct TableResolver {
    areas: HashMap<RecordId, Area>,
    failing: Vec<RecordId>,
    delays: HashMap<RecordId, Duration>,
    seen: Mutex<Vec<RecordId>>,
}

impl TableResolver {
    fn with(names: &[(RecordId, &str)]) -> Self {
        Self {
            areas: names
                .iter()
                .map(|(id, name)| (*id, Area::new(*name, "").with_id(*id)))
                .collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl KeyResolver<Area> for TableResolver {
    async fn resolve(&self, key: RecordId) -> Result<Option<Area>, LookupError> {
        self.seen.lock().await.push(key);
        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&key) {
            return Err(LookupError::Peer(PeerError::Transport {
                peer: AREA.to_string(),
                path: format!("/areas/{key}"),
                cause: TransportCause::Status(500),
            }));
        }
        Ok(self.areas.get(&key).cloned())
    }
}

fn counts(pairs: &[(RecordId, u64)]) -> FixedCounts {
    FixedCounts(pairs.iter().copied().collect())
}

fn aggregator() -> RankingAggregator {
    RankingAggregator::new(4, Duration::from_secs(5))
}

fn names(ranking: &Ranking<Area>) -> Vec<&str> {
    ranking.entries.iter().map(|e| e.record.name.as_str()).collect()
}

#[test]
fn test_rank_keys_orders_by_count_then_key() {
    let map: CountMap = [(7, 2), (3, 9), (5, 2), (1, 4)].into_iter().collect();
    assert_eq!(rank_keys(map), vec![(3, 9), (1, 4), (5, 2), (7, 2)]);
}

#[tokio::test]
async fn test_sales_before_ops() {
    let resolver = TableResolver::with(&[(1, "Sales"), (2, "Ops")]);

    let ranking = aggregator()
        .rank::<Area>(&counts(&[(1, 5), (2, 3)]), &resolver, FailurePolicy::FailFast)
        .await
        .unwrap();

    assert_eq!(names(&ranking), vec!["Sales", "Ops"]);
    assert_eq!(ranking.entries[0].count, 5);
    assert!(ranking.failed.is_empty());
}

#[tokio::test]
async fn test_output_is_sorted_descending_for_many_keys() {
    let pairs: Vec<(RecordId, u64)> = (1..=40).map(|k| (k, (k as u64 * 7) % 11)).collect();
    let names_owned: Vec<(RecordId, String)> =
        (1..=40).map(|k| (k, format!("area-{k}"))).collect();
    let borrowed: Vec<(RecordId, &str)> =
        names_owned.iter().map(|(k, n)| (*k, n.as_str())).collect();
    let resolver = TableResolver::with(&borrowed);

    let ranking = aggregator()
        .rank::<Area>(&counts(&pairs), &resolver, FailurePolicy::FailFast)
        .await
        .unwrap();

    assert_eq!(ranking.entries.len(), 40);
    for pair in ranking.entries.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.count > b.count || (a.count == b.count && a.record.id < b.record.id));
    }
}

#[tokio::test]
async fn test_order_preserved_when_later_lookups_finish_first() {
    let mut resolver = TableResolver::with(&[(1, "Slow"), (2, "Fast")]);
    resolver.delays.insert(1, Duration::from_millis(50));

    let ranking = aggregator()
        .rank::<Area>(&counts(&[(1, 9), (2, 1)]), &resolver, FailurePolicy::FailFast)
        .await
        .unwrap();

    assert_eq!(names(&ranking), vec!["Slow", "Fast"]);
}

#[tokio::test]
async fn test_empty_counts_yield_empty_ranking() {
    let resolver = TableResolver::default();

    let ranking = aggregator()
        .rank::<Area>(&counts(&[]), &resolver, FailurePolicy::FailFast)
        .await
        .unwrap();

    assert!(ranking.entries.is_empty());
    assert!(resolver.seen.lock().await.is_empty());
}

#[tokio::test]
async fn test_fail_fast_on_lookup_error() {
    let mut resolver = TableResolver::with(&[(1, "Sales")]);
    resolver.failing.push(1);

    let err = aggregator()
        .rank::<Area>(&counts(&[(1, 5)]), &resolver, FailurePolicy::FailFast)
        .await
        .unwrap_err();

    assert!(matches!(err, RankingError::Resolve { key: 1, .. }));
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_fail_fast_on_unresolvable_key() {
    let resolver = TableResolver::with(&[(1, "Sales")]);

    let err = aggregator()
        .rank::<Area>(&counts(&[(1, 5), (2, 3)]), &resolver, FailurePolicy::FailFast)
        .await
        .unwrap_err();

    assert!(matches!(err, RankingError::Unresolved(2)));
}

#[tokio::test]
async fn test_degraded_reports_failed_keys() {
    let mut resolver = TableResolver::with(&[(1, "Sales"), (2, "Ops")]);
    resolver.failing.push(1);

    let ranking = aggregator()
        .rank::<Area>(
            &counts(&[(1, 5), (2, 3), (3, 1)]),
            &resolver,
            FailurePolicy::Degraded,
        )
        .await
        .unwrap();

    assert_eq!(names(&ranking), vec!["Ops"]);
    let failed: Vec<(RecordId, u64)> = ranking.failed.iter().map(|f| (f.key, f.count)).collect();
    assert_eq!(failed, vec![(1, 5), (3, 1)]);
    assert!(ranking.failed[0].error.contains("500"));
    assert!(ranking.failed[1].error.contains("not found"));
}

#[tokio::test]
async fn test_deadline_exceeded() {
    let mut resolver = TableResolver::with(&[(1, "Sales")]);
    resolver.delays.insert(1, Duration::from_secs(5));

    let err = RankingAggregator::new(2, Duration::from_millis(20))
        .rank::<Area>(&counts(&[(1, 5)]), &resolver, FailurePolicy::Degraded)
        .await
        .unwrap_err();

    assert!(matches!(err, RankingError::DeadlineExceeded(_)));
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl KeyResolver<Area> for Gauge {
        async fn resolve(&self, key: RecordId) -> Result<Option<Area>, LookupError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(Area::new("a", "").with_id(key)))
        }
    }

    let gauge = Gauge {
        current: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    };
    let pairs: Vec<(RecordId, u64)> = (1..=20).map(|k| (k, 1)).collect();

    let ranking = RankingAggregator::new(3, Duration::from_secs(5))
        .rank::<Area>(&counts(&pairs), &gauge, FailurePolicy::FailFast)
        .await
        .unwrap();

    assert_eq!(ranking.entries.len(), 20);
    assert!(gauge.peak.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn test_count_phase_failure() {
    let transport = Arc::new(StaticTransport::new());
    transport.respond_status(PROJECT, "/projects/project-countAreas", 502).await;
    let peers = PeerClient::new(transport, Duration::from_secs(1));
    let source = PeerCounts::new(peers, PROJECT, "/projects/project-countAreas");
    let resolver = TableResolver::default();

    let err = aggregator()
        .rank::<Area>(&source, &resolver, FailurePolicy::Degraded)
        .await
        .unwrap_err();

    assert!(matches!(err, RankingError::Count(LookupError::Peer(_))));
}

#[tokio::test]
async fn test_peer_counts_with_store_resolver() {
    let transport = Arc::new(StaticTransport::new());
    transport
        .respond_json(PROJECT, "/projects/project-countAreas", json!({"1": 5, "2": 3}))
        .await;
    let peers = PeerClient::new(transport, Duration::from_secs(1));
    let store: Arc<dyn RecordStore<Area>> = Arc::new(
        InMemoryRecordStore::seeded([Area::new("Sales", ""), Area::new("Ops", "")]).await,
    );

    let ranking = aggregator()
        .rank::<Area>(
            &PeerCounts::new(peers, PROJECT, "/projects/project-countAreas"),
            &StoreResolver::new(store),
            FailurePolicy::FailFast,
        )
        .await
        .unwrap();

    assert_eq!(names(&ranking), vec!["Sales", "Ops"]);
}

#[tokio::test]
async fn test_store_counts_with_peer_resolver() {
    let store: Arc<dyn RecordStore<Project>> = Arc::new(
        InMemoryRecordStore::seeded([
            Project::new("a", 2),
            Project::new("b", 2),
            Project::new("c", 1),
        ])
        .await,
    );
    let transport = Arc::new(StaticTransport::new());
    transport
        .respond_json(AREA, "/areas/2", json!({"id": 2, "name": "Ops"}))
        .await;
    let peers = PeerClient::new(transport, Duration::from_secs(1));

    let ranking: Ranking<Area> = aggregator()
        .rank::<Area>(
            &StoreCounts::new(store, ProjectKey::Area),
            &PeerResolver::new(peers, AREA, "/areas"),
            FailurePolicy::Degraded,
        )
        .await
        .unwrap();

    assert_eq!(names(&ranking), vec!["Ops"]);
    assert_eq!(ranking.entries[0].count, 2);
    assert_eq!(ranking.failed.len(), 1);
    assert_eq!(ranking.failed[0].key, 1);
}

#[test]
fn test_ranked_entry_serializes_flat() {
    let entry = RankedEntry {
        record: Area::new("Sales", "").with_id(1),
        count: 5,
    };
    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value["name"], "Sales");
    assert_eq!(value["count"], 5);

    let area: Area = serde_json::from_value(value).unwrap();
    assert_eq!(area.id, Some(1));
}
