//! Typed calls to sibling services.
//!
//! A [`PeerClient`] decodes JSON responses from a named peer into a single
//! record, a list of records, or a count map. The network itself sits behind
//! [`PeerTransport`] so tests can substitute canned responses.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::model::CountMap;

mod mock;
mod transport;

pub use mock::StaticTransport;
pub use transport::{HttpTransport, PeerDirectory};


/// Logical name of the area service.
pub const AREA: &str = "area";
/// Logical name of the people service.
pub const PEOPLE: &str = "people";
/// Logical name of the project service.
pub const PROJECT: &str = "project";
/// Logical name of the ticket service.
pub const TICKET: &str = "ticket";

/// Raw response from a peer.
#[derive(Debug, Clone)]
pub struct PeerResponse {
    pub status: u16,
    pub body: Bytes,
}

impl PeerResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why a peer call failed below the level of a successful response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportCause {
    #[error("no address configured for peer")]
    UnknownPeer,

    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("undecodable body: {0}")]
    Decode(String),
}

/// Error returned by [`PeerClient`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeerError {
    #[error("{peer} has no record at {path}")]
    NotFound { peer: String, path: String },

    #[error("call to {peer} {path} failed: {cause}")]
    Transport {
        peer: String,
        path: String,
        cause: TransportCause,
    },
}

impl PeerError {
    fn transport(peer: &str, path: &str, cause: TransportCause) -> Self {
        PeerError::Transport {
            peer: peer.to_string(),
            path: path.to_string(),
            cause,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            PeerError::Transport {
                cause: TransportCause::TimedOut(_),
                ..
            }
        )
    }
}

/// Issues GET requests to a named peer.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn get(&self, peer: &str, path: &str) -> Result<PeerResponse, TransportCause>;
}

/// Typed peer calls with a per-call timeout. No retries.
#[derive(Clone)]
pub struct PeerClient {
    transport: Arc<dyn PeerTransport>,
    call_timeout: Duration,
}

impl PeerClient {
    pub fn new(transport: Arc<dyn PeerTransport>, call_timeout: Duration) -> Self {
        Self {
            transport,
            call_timeout,
        }
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Fetch a single record. A 404 is reported as [`PeerError::NotFound`].
    pub async fn fetch_one<T: DeserializeOwned>(
        &self,
        peer: &str,
        path: &str,
    ) -> Result<T, PeerError> {
        let response = self.call(peer, path).await?;
        if response.status == 404 {
            debug!(peer, path, "Peer record not found");
            return Err(PeerError::NotFound {
                peer: peer.to_string(),
                path: path.to_string(),
            });
        }
        self.decode(peer, path, response)
    }

    /// Fetch a list of records. Any non-2xx status, 404 included, is a transport error.
    pub async fn fetch_many<T: DeserializeOwned>(
        &self,
        peer: &str,
        path: &str,
    ) -> Result<Vec<T>, PeerError> {
        let response = self.call(peer, path).await?;
        let records: Vec<T> = self.decode(peer, path, response)?;
        debug!(peer, path, count = records.len(), "Fetched peer records");
        Ok(records)
    }

    /// Fetch a `{ "<key>": count }` map.
    pub async fn fetch_counts(&self, peer: &str, path: &str) -> Result<CountMap, PeerError> {
        let response = self.call(peer, path).await?;
        let counts: CountMap = self.decode(peer, path, response)?;
        debug!(peer, path, keys = counts.len(), "Fetched peer counts");
        Ok(counts)
    }

    async fn call(&self, peer: &str, path: &str) -> Result<PeerResponse, PeerError> {
        debug!(peer, path, "Calling peer");
        match tokio::time::timeout(self.call_timeout, self.transport.get(peer, path)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(cause)) => {
                warn!(peer, path, error = %cause, "Peer call failed");
                Err(PeerError::transport(peer, path, cause))
            }
            Err(_) => {
                warn!(peer, path, timeout = ?self.call_timeout, "Peer call timed out");
                Err(PeerError::transport(
                    peer,
                    path,
                    TransportCause::TimedOut(self.call_timeout),
                ))
            }
        }
    }

    fn decode<T: DeserializeOwned>(
        &self,
        peer: &str,
        path: &str,
        response: PeerResponse,
    ) -> Result<T, PeerError> {
        if !response.is_success() {
            warn!(peer, path, status = response.status, "Peer returned error status");
            return Err(PeerError::transport(
                peer,
                path,
                TransportCause::Status(response.status),
            ));
        }
        serde_json::from_slice(&response.body).map_err(|e| {
            warn!(peer, path, error = %e, "Peer returned undecodable body");
            PeerError::transport(peer, path, TransportCause::Decode(e.to_string()))
        })
    }
}
