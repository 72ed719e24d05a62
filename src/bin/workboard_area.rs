//! workboard-area: area records and the areas-by-project-count ranking.

use std::sync::Arc;

use tracing::{error, info};

use workboard::aggregation::RankingAggregator;
use workboard::config::{Config, ServiceKind};
use workboard::handlers::rest::{self, with_layers};
use workboard::model::Area;
use workboard::services::AreaService;
use workboard::utils::bootstrap::{
    init_tracing, open_store, parse_config_path, peer_client, BoxError,
};

const KIND: ServiceKind = ServiceKind::Area;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let store = open_store::<Area>(&config, KIND).await?;
    let peers = peer_client(&config)?;
    let ranking = RankingAggregator::from_limits(&config.fanout);
    let app = rest::areas::router(Arc::new(AreaService::new(store, peers, ranking)));

    let port = config.server.port_for(KIND);
    info!(service = KIND.peer_name(), port, "starting workboard service");

    let listener = rest::bind(&config.server.host, port).await?;
    rest::serve(listener, with_layers(app)).await
}
