//! HTTP surface of the four services.
//!
//! Each service mounts its own router plus `GET /health`. Errors render as
//! plain text:
//! - validation → 400
//! - missing record → 404
//! - peer unreachable or bad status → 502
//! - peer timeout or ranking deadline → 504
//! - storage → 500

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::aggregation::{FailurePolicy, LookupError, Ranking, RankingError};
use crate::model::RecordId;
use crate::services::ServiceError;

pub mod areas;
pub mod people;
pub mod projects;
pub mod tickets;

/// Bind `host:port`. Port 0 asks the OS for an ephemeral port.
pub async fn bind(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind(format!("{host}:{port}")).await
}

/// Serve until Ctrl+C.
pub async fn serve(
    listener: TcpListener,
    app: Router,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let port = listener.local_addr()?.port();
    info!(port, "REST API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;
    info!("REST API stopped");
    Ok(())
}

/// Add `/health`, request tracing and permissive CORS to a service router.
pub fn with_layers(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    router
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// `?partial=true` selects the degraded ranking shape.
#[derive(Debug, Default, Deserialize)]
pub struct RankingQuery {
    #[serde(default)]
    pub partial: bool,
}

impl RankingQuery {
    pub fn policy(&self) -> FailurePolicy {
        if self.partial {
            FailurePolicy::Degraded
        } else {
            FailurePolicy::FailFast
        }
    }
}

/// Fail-fast rankings render as a bare array; degraded ones include failures.
pub fn ranking_response<E: Serialize>(ranking: Ranking<E>, policy: FailurePolicy) -> Response {
    match policy {
        FailurePolicy::FailFast => Json(ranking.entries).into_response(),
        FailurePolicy::Degraded => Json(ranking).into_response(),
    }
}

/// 404 with a plain-text body.
pub fn not_found(kind: &str, id: RecordId) -> Response {
    (StatusCode::NOT_FOUND, format!("No {kind} found with id {id}")).into_response()
}

fn ranking_status(error: &RankingError) -> StatusCode {
    if error.is_timeout() {
        return StatusCode::GATEWAY_TIMEOUT;
    }
    match error {
        RankingError::Count(LookupError::Storage(_))
        | RankingError::Resolve {
            source: LookupError::Storage(_),
            ..
        } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Upstream(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Ranking(e) => ranking_status(e),
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use tower::ServiceExt;

    /// Send a request through the router; returns status and body text.
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, String) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let resp = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub fn json(body: &str) -> serde_json::Value {
        serde_json::from_str(body).unwrap()
    }
}
