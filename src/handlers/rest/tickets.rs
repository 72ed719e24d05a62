//! `/tickets` routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use super::not_found;
use crate::model::{
    CountMap, ProjectProgress, Record, RecordId, Ticket, TicketPriority, TicketStatus, TicketType,
};
use crate::services::{ServiceError, TicketService};

type AppState = Arc<TicketService>;

pub fn router(service: Arc<TicketService>) -> Router {
    Router::new()
        .route("/tickets", get(list).post(create))
        .route("/tickets/search/priority", get(search_priority))
        .route("/tickets/search/status", get(search_status))
        .route("/tickets/search/completed", get(completed))
        .route("/tickets/top-projects-tickets", get(top_projects))
        .route("/tickets/project-count", get(count_by_project))
        .route("/tickets/{id}", get(get_one).put(update).delete(remove))
        .route("/tickets/{id}/priority", put(set_priority))
        .route("/tickets/{id}/status", put(set_status))
        .route("/tickets/{id}/type", put(set_type))
        .route("/tickets/{id}/assign", put(assign))
        .route("/tickets/{id}/progress", put(set_progress))
        .with_state(service)
}

/// 200 when the ticket existed, 404 otherwise.
fn modified(found: bool, what: &str) -> Response {
    if found {
        (StatusCode::OK, format!("Ticket {what} updated")).into_response()
    } else {
        (StatusCode::NOT_FOUND, "Ticket not found").into_response()
    }
}

async fn list(State(service): State<AppState>) -> Result<Json<Vec<Ticket>>, ServiceError> {
    Ok(Json(service.list().await?))
}

async fn get_one(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Response, ServiceError> {
    Ok(match service.get_view(id).await? {
        Some(view) => Json(view).into_response(),
        None => not_found(Ticket::KIND, id),
    })
}

async fn create(
    State(service): State<AppState>,
    Json(ticket): Json<Ticket>,
) -> Result<(StatusCode, Json<Ticket>), ServiceError> {
    Ok((StatusCode::CREATED, Json(service.create(ticket).await?)))
}

async fn update(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
    Json(ticket): Json<Ticket>,
) -> Result<Json<Ticket>, ServiceError> {
    Ok(Json(service.update(id, ticket).await?))
}

async fn remove(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<StatusCode, ServiceError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_priority(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
    Json(priority): Json<TicketPriority>,
) -> Result<Response, ServiceError> {
    Ok(modified(service.update_priority(id, priority).await?, "priority"))
}

async fn set_status(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
    Json(status): Json<TicketStatus>,
) -> Result<Response, ServiceError> {
    Ok(modified(service.update_status(id, status).await?, "status"))
}

async fn set_type(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
    Json(ticket_type): Json<TicketType>,
) -> Result<Response, ServiceError> {
    Ok(modified(service.update_type(id, ticket_type).await?, "type"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Assignment {
    id_people: RecordId,
    id_project: RecordId,
}

async fn assign(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
    Json(body): Json<Assignment>,
) -> Result<Response, ServiceError> {
    let found = service.assign(id, body.id_people, body.id_project).await?;
    Ok(modified(found, "assignment"))
}

#[derive(Debug, Deserialize)]
struct ProgressQuery {
    progress: i32,
}

async fn set_progress(
    State(service): State<AppState>,
    Path(id): Path<RecordId>,
    Query(query): Query<ProgressQuery>,
) -> Result<Response, ServiceError> {
    Ok(modified(service.update_progress(id, query.progress).await?, "progress"))
}

#[derive(Debug, Deserialize)]
struct PriorityQuery {
    priority: TicketPriority,
}

async fn search_priority(
    State(service): State<AppState>,
    Query(query): Query<PriorityQuery>,
) -> Result<Json<Vec<Ticket>>, ServiceError> {
    Ok(Json(service.search_by_priority(query.priority).await?))
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    status: TicketStatus,
}

async fn search_status(
    State(service): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<Ticket>>, ServiceError> {
    Ok(Json(service.search_by_status(query.status).await?))
}

async fn completed(State(service): State<AppState>) -> Result<Json<Vec<Ticket>>, ServiceError> {
    Ok(Json(service.completed().await?))
}

async fn top_projects(
    State(service): State<AppState>,
) -> Result<Json<Vec<ProjectProgress>>, ServiceError> {
    Ok(Json(service.top_projects_by_progress().await?))
}

async fn count_by_project(State(service): State<AppState>) -> Result<Json<CountMap>, ServiceError> {
    Ok(Json(service.count_by_project().await?))
}
