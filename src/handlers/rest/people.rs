//! `/people` routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::not_found;
use crate::model::{Person, Record, RecordId};
use crate::services::{PeopleService, ServiceError};

type AppState = Arc<PeopleService>;

pub fn router(service: Arc<PeopleService>) -> Router {
    Router::new()
        .route("/people", get(list).post(create))
        .route("/people/create", post(create_from_params))
        .route("/people/byName/{name}", get(by_name))
        .route("/people/{id}", get(get_one).put(update).delete(remove))
        .with_state(service)
}

async fn list(State(service): State<AppState>) -> Result<Json<Vec<Person>>, ServiceError> {
    Ok(Json(service.list().await?))
}

async fn get_one(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Response, ServiceError> {
    Ok(match service.get_view(id).await? {
        Some(view) => Json(view).into_response(),
        None => not_found(Person::KIND, id),
    })
}

async fn by_name(
    State(service): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Person>>, ServiceError> {
    Ok(Json(service.find_by_name(&name).await?))
}

async fn create(
    State(service): State<AppState>,
    Json(person): Json<Person>,
) -> Result<(StatusCode, Json<Person>), ServiceError> {
    Ok((StatusCode::CREATED, Json(service.create(person).await?)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonParams {
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    area_id: RecordId,
}

/// Create from query or form parameters; replies with a plain-text message.
async fn create_from_params(
    State(service): State<AppState>,
    Query(params): Query<PersonParams>,
) -> Result<(StatusCode, &'static str), ServiceError> {
    service
        .create(Person::new(params.name, params.email, params.area_id))
        .await?;
    Ok((StatusCode::CREATED, "Person created successfully"))
}

async fn update(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
    Json(person): Json<Person>,
) -> Result<Json<Person>, ServiceError> {
    Ok(Json(service.update(id, person).await?))
}

async fn remove(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<StatusCode, ServiceError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::super::test_support::{json, send};
    use super::*;
    use crate::aggregation::Enricher;
    use crate::peer::{PeerClient, StaticTransport, AREA};
    use crate::storage::InMemoryRecordStore;

    async fn app(transport: &Arc<StaticTransport>) -> Router {
        let store = InMemoryRecordStore::seeded([
            Person::new("Ana Lima", "ana@example.com", 1),
            Person::new("Bob", "bob@example.com", 2),
        ])
        .await;
        let peers = PeerClient::new(transport.clone(), Duration::from_millis(200));
        router(Arc::new(PeopleService::new(Arc::new(store), Enricher::new(peers))))
    }

    #[tokio::test]
    async fn test_get_returns_person_with_area() {
        let transport = Arc::new(StaticTransport::new());
        transport
            .respond_json(AREA, "/areas/1", json!({"id": 1, "name": "Sales", "description": ""}))
            .await;
        let app = app(&transport).await;

        let (status, body) = send(&app, "GET", "/people/1", None).await;

        assert_eq!(status, StatusCode::OK);
        let view = json(&body);
        assert_eq!(view["name"], "Ana Lima");
        assert_eq!(view["areaId"], 1);
        assert_eq!(view["area"]["name"], "Sales");
    }

    #[tokio::test]
    async fn test_get_missing_is_404_without_remote_call() {
        let transport = Arc::new(StaticTransport::new());
        let app = app(&transport).await;

        let (status, _) = send(&app, "GET", "/people/9", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(transport.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_get_with_unknown_area_is_bad_gateway() {
        let transport = Arc::new(StaticTransport::new());
        let app = app(&transport).await;

        let (status, _) = send(&app, "GET", "/people/2", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_by_name_decodes_path() {
        let transport = Arc::new(StaticTransport::new());
        let app = app(&transport).await;

        let (status, body) = send(&app, "GET", "/people/byName/Ana%20Lima", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)[0]["email"], "ana@example.com");
    }

    #[tokio::test]
    async fn test_delete_missing_is_404() {
        let transport = Arc::new(StaticTransport::new());
        let app = app(&transport).await;

        let (status, _) = send(&app, "DELETE", "/people/2", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "DELETE", "/people/2", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_from_params() {
        let transport = Arc::new(StaticTransport::new());
        let app = app(&transport).await;

        let (status, body) = send(
            &app,
            "POST",
            "/people/create?name=Cy&email=cy%40example.com&areaId=2",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, "Person created successfully");

        let (_, body) = send(&app, "GET", "/people/byName/Cy", None).await;
        let person = &json(&body)[0];
        assert_eq!(person["email"], "cy@example.com");
        assert_eq!(person["areaId"], 2);
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let transport = Arc::new(StaticTransport::new());
        let app = app(&transport).await;

        let (status, body) = send(
            &app,
            "POST",
            "/people",
            Some(r#"{"name":"Cy","email":"cy@example.com","username":"cy","areaId":2}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json(&body)["id"], 3);

        let (status, body) = send(
            &app,
            "PUT",
            "/people/3",
            Some(r#"{"name":"Cyrus","email":"cyrus@example.com","areaId":7}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let person = json(&body);
        assert_eq!(person["name"], "Cyrus");
        assert_eq!(person["areaId"], 2);
        assert_eq!(person["username"], "cy");
    }
}
