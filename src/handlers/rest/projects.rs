//! `/projects` routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::{not_found, ranking_response, RankingQuery};
use crate::model::{CountMap, Project, Record, RecordId};
use crate::services::{ProjectService, ServiceError};

type AppState = Arc<ProjectService>;

pub fn router(service: Arc<ProjectService>) -> Router {
    Router::new()
        .route("/projects", get(list).post(create))
        .route("/projects/most-contributors", get(most_contributors))
        .route("/projects/project-countAreas", get(count_by_area))
        .route("/projects/{id}", get(get_one).put(update).delete(remove))
        .route("/projects/{id}/details", get(details))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    area_id: Option<RecordId>,
}

async fn list(
    State(service): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Project>>, ServiceError> {
    Ok(Json(service.list(query.area_id).await?))
}

async fn get_one(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Response, ServiceError> {
    Ok(match service.get_view(id).await? {
        Some(view) => Json(view).into_response(),
        None => not_found(Project::KIND, id),
    })
}

async fn details(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Response, ServiceError> {
    Ok(match service.details(id).await? {
        Some(details) => Json(details).into_response(),
        None => not_found(Project::KIND, id),
    })
}

async fn create(
    State(service): State<AppState>,
    Json(project): Json<Project>,
) -> Result<(StatusCode, Json<Project>), ServiceError> {
    Ok((StatusCode::CREATED, Json(service.create(project).await?)))
}

async fn update(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
    Json(project): Json<Project>,
) -> Result<Json<Project>, ServiceError> {
    Ok(Json(service.update(id, project).await?))
}

async fn remove(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<StatusCode, ServiceError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn most_contributors(
    State(service): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> Result<Response, ServiceError> {
    let policy = query.policy();
    let ranking = service.projects_with_most_contributors(policy).await?;
    Ok(ranking_response(ranking, policy))
}

async fn count_by_area(State(service): State<AppState>) -> Result<Json<CountMap>, ServiceError> {
    Ok(Json(service.count_by_area().await?))
}
