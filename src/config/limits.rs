//! Limits for cross-service fan-out.
//!
//! Every peer call is bounded by `call_timeout_ms`. Ranking calls issue one
//! point lookup per count-map key, at most `concurrency` at a time, and the
//! whole call must finish within `request_deadline_ms`.

use std::time::Duration;

use serde::Deserialize;

/// Default timeout for a single peer call (5 s).
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;

/// Default deadline for a whole aggregation request (30 s).
pub const DEFAULT_REQUEST_DEADLINE_MS: u64 = 30_000;

/// Default number of in-flight lookups per aggregation call.
pub const DEFAULT_FANOUT_CONCURRENCY: usize = 8;

/// Fan-out limits shared by the peer client and the ranking aggregator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FanoutLimits {
    /// Per-call timeout in milliseconds.
    pub call_timeout_ms: u64,
    /// Overall deadline for one aggregation request in milliseconds.
    pub request_deadline_ms: u64,
    /// Maximum concurrent point lookups during a ranking's resolve phase.
    pub concurrency: usize,
}

impl Default for FanoutLimits {
    fn default() -> Self {
        Self {
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            request_deadline_ms: DEFAULT_REQUEST_DEADLINE_MS,
            concurrency: DEFAULT_FANOUT_CONCURRENCY,
        }
    }
}

impl FanoutLimits {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn request_deadline(&self) -> Duration {
        Duration::from_millis(self.request_deadline_ms)
    }

    /// Concurrency clamped to at least one in-flight lookup.
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}
