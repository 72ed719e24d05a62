use std::sync::Arc;

use tracing::info;

use super::{require_id, require_name, Result, ServiceError};
use crate::aggregation::{FailurePolicy, PeerCounts, Ranking, RankingAggregator, StoreResolver};
use crate::model::{Area, Project, Record, RecordId};
use crate::peer::{PeerClient, PROJECT};
use crate::storage::RecordStore;

/// Path on the project service returning `{ "<areaId>": projectCount }`.
pub const PROJECT_COUNT_BY_AREA_PATH: &str = "/projects/project-countAreas";

/// Areas, plus the rankings and listings that need the project service.
pub struct AreaService {
    store: Arc<dyn RecordStore<Area>>,
    peers: PeerClient,
    ranking: RankingAggregator,
}

impl AreaService {
    pub fn new(
        store: Arc<dyn RecordStore<Area>>,
        peers: PeerClient,
        ranking: RankingAggregator,
    ) -> Self {
        Self {
            store,
            peers,
            ranking,
        }
    }

    pub async fn list(&self) -> Result<Vec<Area>> {
        Ok(self.store.find_all().await?)
    }

    pub async fn get(&self, id: RecordId) -> Result<Option<Area>> {
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn create(&self, mut area: Area) -> Result<Area> {
        require_name("Area name", &area.name)?;
        area.id = None;
        let area = self.store.save(area).await?;
        info!(id = ?area.id, name = %area.name, "Created area");
        Ok(area)
    }

    pub async fn update(&self, id: RecordId, changes: Area) -> Result<Area> {
        require_name("Area name", &changes.name)?;
        let mut area = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(Area::KIND, id))?;
        area.apply_changes(changes);
        Ok(self.store.save(area).await?)
    }

    pub async fn delete(&self, id: RecordId) -> Result<()> {
        require_id("Area id", id)?;
        if !self.store.delete_by_id(id).await? {
            return Err(ServiceError::not_found(Area::KIND, id));
        }
        info!(id, "Deleted area");
        Ok(())
    }

    /// Areas ordered by how many projects reference them.
    pub async fn areas_with_most_projects(&self, policy: FailurePolicy) -> Result<Ranking<Area>> {
        let source = PeerCounts::new(self.peers.clone(), PROJECT, PROJECT_COUNT_BY_AREA_PATH);
        let resolver = StoreResolver::new(self.store.clone());
        Ok(self.ranking.rank::<Area>(&source, &resolver, policy).await?)
    }

    /// Projects the project service holds for an area.
    pub async fn projects_for_area(&self, id: RecordId) -> Result<Vec<Project>> {
        let path = format!("/projects?areaId={id}");
        Ok(self.peers.fetch_many(PROJECT, &path).await?)
    }
}
