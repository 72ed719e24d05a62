//! `/areas` routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::{not_found, ranking_response, RankingQuery};
use crate::model::{Area, Project, Record, RecordId};
use crate::services::{AreaService, ServiceError};

type AppState = Arc<AreaService>;

pub fn router(service: Arc<AreaService>) -> Router {
    Router::new()
        .route("/areas", get(list).post(create))
        .route("/areas/create", post(create_from_params))
        .route("/areas/mostProjects", get(most_projects))
        .route("/areas/{id}", get(get_one).put(update).delete(remove))
        .route("/areas/{id}/projects", get(projects))
        .with_state(service)
}

async fn list(State(service): State<AppState>) -> Result<Json<Vec<Area>>, ServiceError> {
    Ok(Json(service.list().await?))
}

async fn get_one(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Response, ServiceError> {
    Ok(match service.get(id).await? {
        Some(area) => Json(area).into_response(),
        None => not_found(Area::KIND, id),
    })
}

async fn create(
    State(service): State<AppState>,
    Json(area): Json<Area>,
) -> Result<(StatusCode, Json<Area>), ServiceError> {
    Ok((StatusCode::CREATED, Json(service.create(area).await?)))
}

#[derive(Debug, Deserialize)]
struct AreaParams {
    name: String,
    #[serde(default)]
    description: String,
}

/// Create from query or form parameters; replies with a plain-text message.
async fn create_from_params(
    State(service): State<AppState>,
    Query(params): Query<AreaParams>,
) -> Result<(StatusCode, &'static str), ServiceError> {
    service
        .create(Area::new(params.name, params.description))
        .await?;
    Ok((StatusCode::CREATED, "Area created successfully"))
}

async fn update(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
    Json(area): Json<Area>,
) -> Result<Json<Area>, ServiceError> {
    Ok(Json(service.update(id, area).await?))
}

async fn remove(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<StatusCode, ServiceError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn most_projects(
    State(service): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> Result<Response, ServiceError> {
    let policy = query.policy();
    let ranking = service.areas_with_most_projects(policy).await?;
    Ok(ranking_response(ranking, policy))
}

async fn projects(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Json<Vec<Project>>, ServiceError> {
    Ok(Json(service.projects_for_area(id).await?))
}
