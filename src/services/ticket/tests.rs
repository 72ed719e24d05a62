use std::time::Duration;

use serde_json::json;

use super::*;
use crate::peer::{PeerClient, StaticTransport, TransportCause, PEOPLE};
use crate::storage::InMemoryRecordStore;

struct Fixture {
    transport: Arc<StaticTransport>,
    store: Arc<InMemoryRecordStore<Ticket>>,
    service: TicketService,
}

async fn fixture(tickets: Vec<Ticket>) -> Fixture {
    let transport = Arc::new(StaticTransport::new());
    let store = Arc::new(InMemoryRecordStore::seeded(tickets).await);
    let peers = PeerClient::new(transport.clone(), Duration::from_secs(1));
    let service = TicketService::new(store.clone(), Enricher::new(peers));
    Fixture {
        transport,
        store,
        service,
    }
}

async fn known_project_and_person(transport: &StaticTransport) {
    transport
        .respond_json(PROJECT, "/projects/4", json!({"id": 4, "name": "Billing", "areaId": 1}))
        .await;
    transport
        .respond_json(
            PEOPLE,
            "/people/9",
            json!({"id": 9, "name": "Ana", "email": "ana@example.com", "areaId": 1}),
        )
        .await;
}

#[tokio::test]
async fn test_create_checks_peers_and_stamps_created_at() {
    let f = fixture(vec![]).await;
    known_project_and_person(&f.transport).await;

    let created = f
        .service
        .create(Ticket::new("Crash", "on start", 4, 9).with_id(500))
        .await
        .unwrap();

    assert_eq!(created.id, Some(1));
    assert!(created.created_at.is_some());
    assert!(created.resolved_at.is_none());
    assert_eq!(f.transport.call_count().await, 2);
}

#[tokio::test]
async fn test_create_with_unknown_person_fails_and_stores_nothing() {
    let f = fixture(vec![]).await;
    f.transport
        .respond_json(PROJECT, "/projects/4", json!({"id": 4, "name": "Billing", "areaId": 1}))
        .await;

    let err = f
        .service
        .create(Ticket::new("Crash", "on start", 4, 9))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Upstream(PeerError::NotFound { .. })));
    assert!(f.store.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_validation_happens_before_remote_calls() {
    let f = fixture(vec![]).await;

    for ticket in [
        Ticket::new("", "d", 4, 9),
        Ticket::new("t", "", 4, 9),
        Ticket::new("t", "d", 0, 9),
        Ticket::new("t", "d", 4, 0),
        Ticket::new("t", "d", 4, 9).with_progress(-1, 5),
        Ticket::new("t", "d", 4, 9).with_progress(1, -5),
    ] {
        assert!(matches!(
            f.service.create(ticket).await,
            Err(ServiceError::Validation(_))
        ));
    }
    assert_eq!(f.transport.call_count().await, 0);
}

#[tokio::test]
async fn test_update_rejects_negative_effort_and_keeps_stored_ticket() {
    let f = fixture(vec![Ticket::new("t", "d", 1, 1).with_progress(2, 10)]).await;

    for changes in [
        Ticket::new("t", "d", 1, 1).with_progress(-5, 10),
        Ticket::new("t", "d", 1, 1).with_progress(5, -10),
    ] {
        assert!(matches!(
            f.service.update(1, changes).await,
            Err(ServiceError::Validation(_))
        ));
    }

    let stored = f.store.find_by_id(1).await.unwrap().unwrap();
    assert_eq!((stored.progress, stored.estimate), (2, 10));

    let updated = f
        .service
        .update(1, Ticket::new("t", "d", 1, 1).with_progress(4, 10))
        .await
        .unwrap();
    assert_eq!(updated.progress, 4);
}

#[tokio::test]
async fn test_get_view() {
    let f = fixture(vec![Ticket::new("Crash", "on start", 4, 9)]).await;
    known_project_and_person(&f.transport).await;

    let view = f.service.get_view(1).await.unwrap().unwrap();
    assert_eq!(view.ticket.title, "Crash");
    assert_eq!(view.project.name, "Billing");
    assert_eq!(view.people.name, "Ana");

    assert!(f.service.get_view(2).await.unwrap().is_none());
    assert_eq!(f.transport.call_count().await, 2);
}

#[tokio::test]
async fn test_update_status_to_done_sets_resolved_at() {
    let f = fixture(vec![Ticket::new("t", "d", 1, 1)]).await;

    assert!(f.service.update_status(1, TicketStatus::InProgress).await.unwrap());
    assert!(f.store.find_by_id(1).await.unwrap().unwrap().resolved_at.is_none());

    assert!(f.service.update_status(1, TicketStatus::Done).await.unwrap());
    let ticket = f.store.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Done);
    assert!(ticket.resolved_at.is_some());

    assert!(!f.service.update_status(2, TicketStatus::Done).await.unwrap());
}

#[tokio::test]
async fn test_single_field_updates_report_existence() {
    let f = fixture(vec![Ticket::new("t", "d", 1, 1)]).await;

    assert!(f.service.update_priority(1, TicketPriority::High).await.unwrap());
    assert!(f.service.update_type(1, TicketType::Bug).await.unwrap());
    assert!(f.service.update_progress(1, 6).await.unwrap());
    assert!(!f.service.update_priority(3, TicketPriority::Low).await.unwrap());

    let ticket = f.store.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(ticket.priority, TicketPriority::High);
    assert_eq!(ticket.ticket_type, TicketType::Bug);
    assert_eq!(ticket.progress, 6);

    assert!(matches!(
        f.service.update_progress(1, -2).await,
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        f.service.update_type(0, TicketType::Bug).await,
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn test_update_keeps_type_and_foreign_keys() {
    let f = fixture(vec![Ticket::new("t", "d", 1, 2)]).await;
    let mut changes = Ticket::new("t2", "d2", 8, 8).with_progress(3, 5);
    changes.ticket_type = TicketType::Feature;
    changes.status = TicketStatus::Done;

    let updated = f.service.update(1, changes).await.unwrap();

    assert_eq!(updated.title, "t2");
    assert_eq!(updated.estimate, 5);
    assert_eq!(updated.project_id, 1);
    assert_eq!(updated.people_id, 2);
    assert_eq!(updated.ticket_type, TicketType::Task);
    assert!(updated.resolved_at.is_some());
}

#[tokio::test]
async fn test_assign() {
    let f = fixture(vec![Ticket::new("t", "d", 1, 1)]).await;
    known_project_and_person(&f.transport).await;

    assert!(f.service.assign(1, 9, 4).await.unwrap());
    let ticket = f.store.find_by_id(1).await.unwrap().unwrap();
    assert_eq!((ticket.people_id, ticket.project_id), (9, 4));

    assert!(!f.service.assign(1, 10, 4).await.unwrap());
    assert!(!f.service.assign(2, 9, 4).await.unwrap());
}

#[tokio::test]
async fn test_assign_propagates_transport_failure() {
    let f = fixture(vec![Ticket::new("t", "d", 1, 1)]).await;
    known_project_and_person(&f.transport).await;
    f.transport
        .fail(PEOPLE, "/people/9", TransportCause::Unreachable("refused".into()))
        .await;

    let err = f.service.assign(1, 9, 4).await.unwrap_err();
    assert!(matches!(err, ServiceError::Upstream(PeerError::Transport { .. })));
}

#[tokio::test]
async fn test_searches_and_counts() {
    let mut done = Ticket::new("a", "a", 1, 1);
    done.status = TicketStatus::Done;
    let mut critical = Ticket::new("b", "b", 1, 2);
    critical.priority = TicketPriority::Critical;
    let f = fixture(vec![done, critical, Ticket::new("c", "c", 2, 2)]).await;

    assert_eq!(f.service.completed().await.unwrap().len(), 1);
    assert_eq!(
        f.service
            .search_by_priority(TicketPriority::Critical)
            .await
            .unwrap()[0]
            .title,
        "b"
    );
    assert_eq!(
        f.service
            .search_by_status(TicketStatus::New)
            .await
            .unwrap()
            .len(),
        2
    );

    let counts = f.service.count_by_project().await.unwrap();
    assert_eq!(counts[&1], 2);
    assert_eq!(counts[&2], 1);
}

#[tokio::test]
async fn test_completed_is_empty_not_error() {
    let f = fixture(vec![Ticket::new("a", "a", 1, 1)]).await;
    assert!(f.service.completed().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_top_projects_by_progress() {
    let f = fixture(vec![
        Ticket::new("a", "a", 1, 1).with_progress(3, 10),
        Ticket::new("b", "b", 1, 1).with_progress(7, 10),
        Ticket::new("c", "c", 3, 1).with_progress(0, 0),
    ])
    .await;
    f.transport
        .respond_json(
            PROJECT,
            "/projects",
            json!([
                {"id": 3, "name": "Infra", "areaId": 1},
                {"id": 2, "name": "Idle", "areaId": 1},
                {"id": 1, "name": "Billing", "areaId": 1}
            ]),
        )
        .await;

    let progress = f.service.top_projects_by_progress().await.unwrap();

    let summary: Vec<_> = progress
        .iter()
        .map(|p| (p.project.name.as_str(), p.top_ticket.title.as_str(), p.progress_percentage))
        .collect();
    assert_eq!(summary, vec![("Infra", "c", 0.0), ("Billing", "b", 50.0)]);
}

#[tokio::test]
async fn test_top_projects_by_progress_fails_when_projects_unavailable() {
    let f = fixture(vec![Ticket::new("a", "a", 1, 1)]).await;
    f.transport.respond_status(PROJECT, "/projects", 503).await;

    let err = f.service.top_projects_by_progress().await.unwrap_err();
    assert!(matches!(err, ServiceError::Upstream(_)));
}
