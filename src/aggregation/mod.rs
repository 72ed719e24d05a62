//! Cross-service composition.
//!
//! - [`Enricher`] decorates a local record with the peer records its foreign
//!   keys point at.
//! - [`RankingAggregator`] turns a count map into an ordered list of resolved
//!   records.
//! - [`progress::synthesize`] joins a parent collection against its
//!   dependents and reports per-parent completion.

mod enrich;
pub mod progress;
pub mod ranking;

pub use enrich::Enricher;
pub use progress::{synthesize, ProgressItem, ProgressRecord};
pub use ranking::{
    rank_keys, CountSource, FailedKey, FailurePolicy, KeyResolver, LookupError, PeerCounts,
    PeerResolver, RankedEntry, Ranking, RankingAggregator, RankingError, StoreCounts,
    StoreResolver,
};
