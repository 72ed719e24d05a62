//! workboard-project: project records and the projects-by-ticket-count ranking.

use std::sync::Arc;

use tracing::{error, info};

use workboard::aggregation::{Enricher, RankingAggregator};
use workboard::config::{Config, ServiceKind};
use workboard::handlers::rest::{self, with_layers};
use workboard::model::Project;
use workboard::services::ProjectService;
use workboard::utils::bootstrap::{
    init_tracing, open_store, parse_config_path, peer_client, BoxError,
};

const KIND: ServiceKind = ServiceKind::Project;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let store = open_store::<Project>(&config, KIND).await?;
    let enricher = Enricher::new(peer_client(&config)?);
    let ranking = RankingAggregator::from_limits(&config.fanout);
    let app = rest::projects::router(Arc::new(ProjectService::new(store, enricher, ranking)));

    let port = config.server.port_for(KIND);
    info!(service = KIND.peer_name(), port, "starting workboard service");

    let listener = rest::bind(&config.server.host, port).await?;
    rest::serve(listener, with_layers(app)).await
}
