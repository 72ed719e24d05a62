use tracing::debug;

use crate::model::{Area, Person, PersonView, Project, ProjectView, RecordId, Ticket, TicketView};
use crate::peer::{PeerClient, PeerError, AREA, PEOPLE, PROJECT};

/// Resolves foreign keys against the owning peers.
///
/// A remote 404 is an error here: a view is only produced when every
/// relation resolves.
#[derive(Clone)]
pub struct Enricher {
    peers: PeerClient,
}

impl Enricher {
    pub fn new(peers: PeerClient) -> Self {
        Self { peers }
    }

    pub fn peers(&self) -> &PeerClient {
        &self.peers
    }

    pub async fn area(&self, id: RecordId) -> Result<Area, PeerError> {
        self.peers.fetch_one(AREA, &format!("/areas/{id}")).await
    }

    pub async fn project(&self, id: RecordId) -> Result<Project, PeerError> {
        self.peers.fetch_one(PROJECT, &format!("/projects/{id}")).await
    }

    pub async fn person(&self, id: RecordId) -> Result<Person, PeerError> {
        self.peers.fetch_one(PEOPLE, &format!("/people/{id}")).await
    }

    pub async fn person_view(&self, person: Person) -> Result<PersonView, PeerError> {
        let area = self.area(person.area_id).await?;
        debug!(person = ?person.id, area = ?area.id, "Enriched person");
        Ok(PersonView { person, area })
    }

    pub async fn project_view(&self, project: Project) -> Result<ProjectView, PeerError> {
        let area = self.area(project.area_id).await?;
        debug!(project = ?project.id, area = ?area.id, "Enriched project");
        Ok(ProjectView { project, area })
    }

    /// Project and assignee are fetched concurrently; both must resolve.
    pub async fn ticket_view(&self, ticket: Ticket) -> Result<TicketView, PeerError> {
        let (project, people) =
            tokio::try_join!(self.project(ticket.project_id), self.person(ticket.people_id))?;
        debug!(ticket = ?ticket.id, project = ?project.id, person = ?people.id, "Enriched ticket");
        Ok(TicketView {
            ticket,
            project,
            people,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::peer::{StaticTransport, TransportCause};

    fn enricher(transport: &Arc<StaticTransport>) -> Enricher {
        Enricher::new(PeerClient::new(transport.clone(), Duration::from_secs(1)))
    }

    #[tokio::test]
    async fn test_ticket_view_carries_both_relations_unmodified() {
        let transport = Arc::new(StaticTransport::new());
        transport
            .respond_json(
                PROJECT,
                "/projects/4",
                json!({"id": 4, "name": "Billing", "startDate": "2024-01-01", "endDate": "", "areaId": 1}),
            )
            .await;
        transport
            .respond_json(
                PEOPLE,
                "/people/9",
                json!({"id": 9, "name": "Ana", "email": "ana@example.com", "username": "ana", "areaId": 1}),
            )
            .await;

        let mut ticket = Ticket::new("Crash", "on start", 4, 9);
        ticket.id = Some(2);
        let view = enricher(&transport).ticket_view(ticket.clone()).await.unwrap();

        assert_eq!(view.ticket, ticket);
        assert_eq!(view.project.name, "Billing");
        assert_eq!(view.project.start_date, "2024-01-01");
        assert_eq!(view.people.username, "ana");
        assert_eq!(transport.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_ticket_view_fails_when_either_relation_fails() {
        let transport = Arc::new(StaticTransport::new());
        transport
            .respond_json(PROJECT, "/projects/4", json!({"id": 4, "name": "Billing", "areaId": 1}))
            .await;
        transport
            .fail(PEOPLE, "/people/9", TransportCause::Unreachable("refused".into()))
            .await;

        let err = enricher(&transport)
            .ticket_view(Ticket::new("t", "d", 4, 9))
            .await
            .unwrap_err();

        assert!(matches!(err, PeerError::Transport { ref peer, .. } if peer == PEOPLE));
    }

    #[tokio::test]
    async fn test_remote_not_found_fails_view() {
        let transport = Arc::new(StaticTransport::new());

        let err = enricher(&transport)
            .project_view(Project::new("Billing", 3))
            .await
            .unwrap_err();

        assert!(matches!(err, PeerError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_person_view_uses_area_id() {
        let transport = Arc::new(StaticTransport::new());
        transport
            .respond_json(AREA, "/areas/3", json!({"id": 3, "name": "Ops", "description": "d"}))
            .await;

        let person = Person::new("Ana", "ana@example.com", 3);
        let view = enricher(&transport).person_view(person.clone()).await.unwrap();

        assert_eq!(view.person, person);
        assert_eq!(view.area.name, "Ops");
        assert_eq!(
            transport.calls().await,
            vec![(AREA.to_string(), "/areas/3".to_string())]
        );
    }
}
