use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::{require_id, require_non_negative, require_text, Result, ServiceError};
use crate::aggregation::{synthesize, Enricher};
use crate::model::{
    CountMap, Project, ProjectProgress, Record, RecordId, Ticket, TicketFilter, TicketKey,
    TicketPriority, TicketStatus, TicketType, TicketView,
};
use crate::peer::{PeerError, PROJECT};
use crate::storage::RecordStore;

/// Tickets, their lifecycle updates, and progress reporting across projects.
pub struct TicketService {
    store: Arc<dyn RecordStore<Ticket>>,
    enricher: Enricher,
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

impl TicketService {
    pub fn new(store: Arc<dyn RecordStore<Ticket>>, enricher: Enricher) -> Self {
        Self { store, enricher }
    }

    pub async fn list(&self) -> Result<Vec<Ticket>> {
        Ok(self.store.find_all().await?)
    }

    /// The ticket with its project and assignee, or `None` without any remote call.
    pub async fn get_view(&self, id: RecordId) -> Result<Option<TicketView>> {
        let Some(ticket) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };
        Ok(Some(self.enricher.ticket_view(ticket).await?))
    }

    /// Validates the ticket and confirms its project and assignee exist.
    pub async fn create(&self, mut ticket: Ticket) -> Result<Ticket> {
        require_text("Ticket title", &ticket.title)?;
        require_text("Ticket description", &ticket.description)?;
        require_id("Project id", ticket.project_id)?;
        require_id("People id", ticket.people_id)?;
        require_non_negative("Progress", ticket.progress)?;
        require_non_negative("Estimate", ticket.estimate)?;

        tokio::try_join!(
            self.enricher.project(ticket.project_id),
            self.enricher.person(ticket.people_id)
        )?;

        let created_at = now();
        ticket.id = None;
        ticket.resolved_at = (ticket.status == TicketStatus::Done).then(|| created_at.clone());
        ticket.created_at = Some(created_at);

        let ticket = self.store.save(ticket).await?;
        info!(
            id = ?ticket.id,
            project_id = ticket.project_id,
            people_id = ticket.people_id,
            "Created ticket"
        );
        Ok(ticket)
    }

    pub async fn update(&self, id: RecordId, changes: Ticket) -> Result<Ticket> {
        require_text("Ticket title", &changes.title)?;
        require_text("Ticket description", &changes.description)?;
        require_non_negative("Progress", changes.progress)?;
        require_non_negative("Estimate", changes.estimate)?;
        let mut ticket = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(Ticket::KIND, id))?;
        let status = changes.status;
        ticket.apply_changes(changes);
        mark_resolved(&mut ticket, status);
        Ok(self.store.save(ticket).await?)
    }

    pub async fn delete(&self, id: RecordId) -> Result<()> {
        require_id("Ticket id", id)?;
        if !self.store.delete_by_id(id).await? {
            return Err(ServiceError::not_found(Ticket::KIND, id));
        }
        info!(id, "Deleted ticket");
        Ok(())
    }

    /// Load, modify and save one ticket. Returns whether it existed.
    async fn modify(
        &self,
        id: RecordId,
        change: impl FnOnce(&mut Ticket) + Send,
    ) -> Result<bool> {
        require_id("Ticket id", id)?;
        let Some(mut ticket) = self.store.find_by_id(id).await? else {
            debug!(id, "Ticket to modify not found");
            return Ok(false);
        };
        change(&mut ticket);
        self.store.save(ticket).await?;
        Ok(true)
    }

    pub async fn update_priority(&self, id: RecordId, priority: TicketPriority) -> Result<bool> {
        self.modify(id, |ticket| ticket.priority = priority).await
    }

    /// Moving to `Done` stamps `resolved_at`.
    pub async fn update_status(&self, id: RecordId, status: TicketStatus) -> Result<bool> {
        self.modify(id, |ticket| {
            ticket.status = status;
            mark_resolved(ticket, status);
        })
        .await
    }

    pub async fn update_type(&self, id: RecordId, ticket_type: TicketType) -> Result<bool> {
        self.modify(id, |ticket| ticket.ticket_type = ticket_type).await
    }

    pub async fn update_progress(&self, id: RecordId, progress: i32) -> Result<bool> {
        require_non_negative("Progress", progress)?;
        self.modify(id, |ticket| ticket.progress = progress).await
    }

    /// Reassign a ticket. Returns `false` when the ticket, the person or the
    /// project does not exist; other peer failures are errors.
    pub async fn assign(
        &self,
        id: RecordId,
        person_id: RecordId,
        project_id: RecordId,
    ) -> Result<bool> {
        require_id("Ticket id", id)?;
        require_id("People id", person_id)?;
        require_id("Project id", project_id)?;
        if self.store.find_by_id(id).await?.is_none() {
            return Ok(false);
        }

        let lookups = tokio::try_join!(
            self.enricher.person(person_id),
            self.enricher.project(project_id)
        );
        match lookups {
            Ok(_) => {}
            Err(PeerError::NotFound { peer, path }) => {
                debug!(id, peer = %peer, path = %path, "Assignment target not found");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }

        let assigned = self
            .modify(id, |ticket| {
                ticket.people_id = person_id;
                ticket.project_id = project_id;
            })
            .await?;
        if assigned {
            info!(id, person_id, project_id, "Assigned ticket");
        }
        Ok(assigned)
    }

    pub async fn search_by_priority(&self, priority: TicketPriority) -> Result<Vec<Ticket>> {
        Ok(self
            .store
            .find_matching(&TicketFilter::Priority(priority))
            .await?)
    }

    pub async fn search_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>> {
        Ok(self
            .store
            .find_matching(&TicketFilter::Status(status))
            .await?)
    }

    pub async fn completed(&self) -> Result<Vec<Ticket>> {
        self.search_by_status(TicketStatus::Done).await
    }

    /// Number of tickets per project.
    pub async fn count_by_project(&self) -> Result<CountMap> {
        Ok(self.store.count_grouped_by(TicketKey::Project).await?)
    }

    /// For every project with tickets: its furthest-progressed ticket and
    /// overall completion, in the project service's order.
    pub async fn top_projects_by_progress(&self) -> Result<Vec<ProjectProgress>> {
        let projects: Vec<Project> = self.enricher.peers().fetch_many(PROJECT, "/projects").await?;
        let tickets = self.store.find_all().await?;
        Ok(synthesize(projects, &tickets)
            .into_iter()
            .map(ProjectProgress::from)
            .collect())
    }
}

fn mark_resolved(ticket: &mut Ticket, status: TicketStatus) {
    if status == TicketStatus::Done && ticket.resolved_at.is_none() {
        ticket.resolved_at = Some(now());
    }
}

#[cfg(test)]
mod tests;
