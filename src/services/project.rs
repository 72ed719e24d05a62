use std::sync::Arc;

use tracing::info;

use super::{require_id, require_name, Result, ServiceError};
use crate::aggregation::{
    Enricher, FailurePolicy, PeerCounts, Ranking, RankingAggregator, StoreResolver,
};
use crate::model::{
    CountMap, Project, ProjectDetails, ProjectFilter, ProjectKey, ProjectView, Record, RecordId,
};
use crate::peer::TICKET;
use crate::storage::RecordStore;

/// Path on the ticket service returning `{ "<projectId>": ticketCount }`.
pub const TICKET_COUNT_BY_PROJECT_PATH: &str = "/tickets/project-count";

pub struct ProjectService {
    store: Arc<dyn RecordStore<Project>>,
    enricher: Enricher,
    ranking: RankingAggregator,
}

impl ProjectService {
    pub fn new(
        store: Arc<dyn RecordStore<Project>>,
        enricher: Enricher,
        ranking: RankingAggregator,
    ) -> Self {
        Self {
            store,
            enricher,
            ranking,
        }
    }

    /// All projects, or those of one area.
    pub async fn list(&self, area_id: Option<RecordId>) -> Result<Vec<Project>> {
        let projects = match area_id {
            Some(area_id) => {
                self.store
                    .find_matching(&ProjectFilter::Area(area_id))
                    .await?
            }
            None => self.store.find_all().await?,
        };
        Ok(projects)
    }

    /// The project with its area, or `None` without calling the area service.
    pub async fn get_view(&self, id: RecordId) -> Result<Option<ProjectView>> {
        let Some(project) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };
        Ok(Some(self.enricher.project_view(project).await?))
    }

    pub async fn details(&self, id: RecordId) -> Result<Option<ProjectDetails>> {
        Ok(self.store.find_by_id(id).await?.map(ProjectDetails::from))
    }

    pub async fn create(&self, mut project: Project) -> Result<Project> {
        require_name("Project name", &project.name)?;
        project.id = None;
        let project = self.store.save(project).await?;
        info!(id = ?project.id, area_id = project.area_id, "Created project");
        Ok(project)
    }

    pub async fn update(&self, id: RecordId, changes: Project) -> Result<Project> {
        require_name("Project name", &changes.name)?;
        let mut project = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(Project::KIND, id))?;
        project.apply_changes(changes);
        Ok(self.store.save(project).await?)
    }

    pub async fn delete(&self, id: RecordId) -> Result<()> {
        require_id("Project id", id)?;
        if !self.store.delete_by_id(id).await? {
            return Err(ServiceError::not_found(Project::KIND, id));
        }
        info!(id, "Deleted project");
        Ok(())
    }

    /// Number of projects per area.
    pub async fn count_by_area(&self) -> Result<CountMap> {
        Ok(self.store.count_grouped_by(ProjectKey::Area).await?)
    }

    /// Projects ordered by how many tickets reference them.
    pub async fn projects_with_most_contributors(
        &self,
        policy: FailurePolicy,
    ) -> Result<Ranking<Project>> {
        let source = PeerCounts::new(
            self.enricher.peers().clone(),
            TICKET,
            TICKET_COUNT_BY_PROJECT_PATH,
        );
        let resolver = StoreResolver::new(self.store.clone());
        Ok(self.ranking.rank::<Project>(&source, &resolver, policy).await?)
    }
}
