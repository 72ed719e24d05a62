//! In-memory transport with canned responses, for testing.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::{PeerResponse, PeerTransport, TransportCause};

type Route = (String, String);

#[derive(Debug, Clone)]
enum Canned {
    Reply {
        status: u16,
        body: Bytes,
        delay: Option<Duration>,
    },
    Fail(TransportCause),
}

/// Transport that answers from a fixed table and records every call.
///
/// Routes without a canned answer reply 404 with an empty body.
#[derive(Default)]
pub struct StaticTransport {
    routes: RwLock<HashMap<Route, Canned>>,
    calls: RwLock<Vec<Route>>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    async fn set(&self, peer: &str, path: &str, canned: Canned) {
        self.routes
            .write()
            .await
            .insert((peer.to_string(), path.to_string()), canned);
    }

    /// Reply 200 with a JSON body.
    pub async fn respond_json(&self, peer: &str, path: &str, body: serde_json::Value) {
        self.set(
            peer,
            path,
            Canned::Reply {
                status: 200,
                body: Bytes::from(body.to_string()),
                delay: None,
            },
        )
        .await;
    }

    /// Reply 200 with a JSON body after sleeping.
    pub async fn respond_json_after(
        &self,
        peer: &str,
        path: &str,
        body: serde_json::Value,
        delay: Duration,
    ) {
        self.set(
            peer,
            path,
            Canned::Reply {
                status: 200,
                body: Bytes::from(body.to_string()),
                delay: Some(delay),
            },
        )
        .await;
    }

    /// Reply with a bare status and an empty body.
    pub async fn respond_status(&self, peer: &str, path: &str, status: u16) {
        self.set(
            peer,
            path,
            Canned::Reply {
                status,
                body: Bytes::new(),
                delay: None,
            },
        )
        .await;
    }

    /// Fail the call without a response.
    pub async fn fail(&self, peer: &str, path: &str, cause: TransportCause) {
        self.set(peer, path, Canned::Fail(cause)).await;
    }

    /// Every `(peer, path)` requested so far, in call order.
    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl PeerTransport for StaticTransport {
    async fn get(&self, peer: &str, path: &str) -> Result<PeerResponse, TransportCause> {
        let route = (peer.to_string(), path.to_string());
        self.calls.write().await.push(route.clone());

        let canned = self.routes.read().await.get(&route).cloned();
        match canned {
            None => Ok(PeerResponse {
                status: 404,
                body: Bytes::new(),
            }),
            Some(Canned::Fail(cause)) => Err(cause),
            Some(Canned::Reply {
                status,
                body,
                delay,
            }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(PeerResponse { status, body })
            }
        }
    }
}
