//! HTTP transport over reqwest, with a static peer directory.
//!
//! # Environment Variable Configuration
//!
//! ```bash
//! # Peers: WORKBOARD_PEER_{NAME}=url
//! WORKBOARD_PEER_PROJECT=http://project.internal:9092
//! WORKBOARD_PEER_TICKET=http://ticket.internal:9093
//! ```

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, info, warn};

use super::{PeerResponse, PeerTransport, TransportCause};
use crate::config::{ConfigError, PeerEndpoint, ServiceKind, PEER_ENV_PREFIX};

/// Logical peer name → base URL.
#[derive(Debug, Clone, Default)]
pub struct PeerDirectory {
    urls: HashMap<String, Url>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every service on localhost at its default port.
    pub fn localhost() -> Self {
        let mut directory = Self::new();
        for kind in ServiceKind::ALL {
            let url = format!("http://localhost:{}", kind.default_port());
            if let Ok(url) = Url::parse(&url) {
                directory.urls.insert(kind.peer_name().to_string(), url);
            }
        }
        directory
    }

    /// Defaults, then configured endpoints, then `WORKBOARD_PEER_*` overrides.
    pub fn from_config(peers: &[PeerEndpoint]) -> Result<Self, ConfigError> {
        let mut directory = Self::localhost();
        for peer in peers {
            directory.register(&peer.name, &peer.url)?;
        }

        for (key, value) in std::env::vars() {
            if let Some(name) = key.strip_prefix(PEER_ENV_PREFIX) {
                let name = name.to_lowercase();
                if let Err(e) = directory.register(&name, &value) {
                    warn!(key = %key, value = %value, error = %e, "Ignoring peer override");
                }
            }
        }

        info!(peers = directory.urls.len(), "Peer directory initialized");
        Ok(directory)
    }

    pub fn register(&mut self, name: &str, url: &str) -> Result<(), ConfigError> {
        let parsed = Url::parse(url).map_err(|_| ConfigError::InvalidPeerUrl {
            name: name.to_string(),
            url: url.to_string(),
        })?;
        debug!(peer = name, url = %parsed, "Registered peer");
        self.urls.insert(name.to_string(), parsed);
        Ok(())
    }

    pub fn base_url(&self, name: &str) -> Option<&Url> {
        self.urls.get(name)
    }

    /// Full URL for a path on a peer, or `None` when the peer is unknown.
    pub fn resolve(&self, name: &str, path: &str) -> Option<String> {
        self.base_url(name)
            .map(|base| format!("{}{}", base.as_str().trim_end_matches('/'), path))
    }
}

/// reqwest-backed [`PeerTransport`].
pub struct HttpTransport {
    client: Client,
    directory: PeerDirectory,
    call_timeout: Duration,
}

impl HttpTransport {
    pub fn new(directory: PeerDirectory, call_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(call_timeout).build()?;
        Ok(Self {
            client,
            directory,
            call_timeout,
        })
    }
}

#[async_trait]
impl PeerTransport for HttpTransport {
    async fn get(&self, peer: &str, path: &str) -> Result<PeerResponse, TransportCause> {
        let url = self
            .directory
            .resolve(peer, path)
            .ok_or(TransportCause::UnknownPeer)?;

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        Ok(PeerResponse { status, body })
    }
}

impl HttpTransport {
    fn classify(&self, error: reqwest::Error) -> TransportCause {
        if error.is_timeout() {
            TransportCause::TimedOut(self.call_timeout)
        } else {
            TransportCause::Unreachable(error.to_string())
        }
    }
}
