//! Project endpoints: CRUD plus the expiring/expired views.
//!
//! The views are filters over active projects; a project past its expiry
//! date keeps `status = "active"` until the user updates it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use pantryctl_core::models::{Project, ProjectFields, ProjectStatus};
use pantryctl_core::validate::{parse_date, ValidationError};

use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::routes::MessageResponse;
use crate::http::server::AppState;
use crate::store::ProjectStore;

const DEFAULT_EXPIRING_WINDOW_DAYS: i64 = 7;

#[derive(Serialize)]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub start_date: String,
    pub ready_date: Option<String>,
    pub expiry_date: Option<String>,
    pub status: &'static str,
    pub location: String,
    pub notes: String,
    pub created_at: String,
    pub last_updated: String,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            kind: p.kind,
            start_date: p.start_date.to_string(),
            ready_date: p.ready_date.map(|d| d.to_string()),
            expiry_date: p.expiry_date.map(|d| d.to_string()),
            status: p.status.as_str(),
            location: p.location,
            notes: p.notes,
            created_at: p.created_at.to_rfc3339(),
            last_updated: p.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<String>,
    pub ready_date: Option<String>,
    pub expiry_date: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Update request; absent fields keep their current values.
#[derive(Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<String>,
    pub ready_date: Option<String>,
    pub expiry_date: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct ExpiringParams {
    pub days: Option<String>,
}

fn parse_status(raw: &str) -> Result<ProjectStatus, ValidationError> {
    ProjectStatus::from_str(raw).ok_or(ValidationError::BadProjectStatus)
}

/// GET /projects
async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let projects = state.store.list_projects().await?;
    Ok(Json(projects.into_iter().map(ProjectResponse::from).collect()))
}

/// GET /projects/{id}
async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let project = state
        .store
        .get_project(&id)
        .await?
        .ok_or_else(ApiError::project_not_found)?;
    Ok(Json(project.into()))
}

/// POST /projects
async fn create_project(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let name = req.name.ok_or(ValidationError::MissingFields)?;
    let kind = req.kind.ok_or(ValidationError::MissingFields)?;
    let start_raw = req.start_date.ok_or(ValidationError::MissingFields)?;

    let fields = ProjectFields {
        name,
        kind,
        start_date: parse_date(&start_raw, "start_date")?,
        ready_date: req
            .ready_date
            .as_deref()
            .map(|d| parse_date(d, "ready_date"))
            .transpose()?,
        expiry_date: req
            .expiry_date
            .as_deref()
            .map(|d| parse_date(d, "expiry_date"))
            .transpose()?,
        status: req
            .status
            .as_deref()
            .map(parse_status)
            .transpose()?
            .unwrap_or_default(),
        location: req.location.unwrap_or_default(),
        notes: req.notes.unwrap_or_default(),
    };

    let id = state.store.create_project(fields).await?;
    let project = refetch_project(&state, &id).await?;
    Ok((StatusCode::CREATED, Json(project.into())))
}

/// PUT /projects/{id} - merge provided fields over the existing row
async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let existing = state
        .store
        .get_project(&id)
        .await?
        .ok_or_else(ApiError::project_not_found)?;

    let fields = ProjectFields {
        name: req.name.unwrap_or(existing.name),
        kind: req.kind.unwrap_or(existing.kind),
        start_date: match req.start_date.as_deref() {
            Some(raw) => parse_date(raw, "start_date")?,
            None => existing.start_date,
        },
        ready_date: match req.ready_date.as_deref() {
            Some(raw) => Some(parse_date(raw, "ready_date")?),
            None => existing.ready_date,
        },
        expiry_date: match req.expiry_date.as_deref() {
            Some(raw) => Some(parse_date(raw, "expiry_date")?),
            None => existing.expiry_date,
        },
        status: match req.status.as_deref() {
            Some(raw) => parse_status(raw)?,
            None => existing.status,
        },
        location: req.location.unwrap_or(existing.location),
        notes: req.notes.unwrap_or(existing.notes),
    };

    if !state.store.update_project(&id, fields).await? {
        return Err(ApiError::project_not_found());
    }
    let project = refetch_project(&state, &id).await?;
    Ok(Json(project.into()))
}

/// DELETE /projects/{id}
async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.store.delete_project(&id).await? {
        return Err(ApiError::project_not_found());
    }
    Ok(Json(MessageResponse {
        message: "Project deleted successfully",
    }))
}

/// GET /projects/expiring?days=N - active projects expiring within the window
async fn list_expiring(
    State(state): State<AppState>,
    Query(params): Query<ExpiringParams>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let days = match params.days.as_deref() {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::NotAnInteger { field: "days" })?,
        None => DEFAULT_EXPIRING_WINDOW_DAYS,
    };
    let projects = state.store.list_expiring_projects(days).await?;
    Ok(Json(projects.into_iter().map(ProjectResponse::from).collect()))
}

/// GET /projects/expired - active projects already past expiry
async fn list_expired(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let projects = state.store.list_expired_projects().await?;
    Ok(Json(projects.into_iter().map(ProjectResponse::from).collect()))
}

async fn refetch_project(state: &AppState, id: &str) -> Result<Project, ApiError> {
    state
        .store
        .get_project(id)
        .await?
        .ok_or_else(|| ApiError::Internal {
            message: format!("project '{id}' vanished after write"),
        })
}

/// Project routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/expiring", get(list_expiring))
        .route("/projects/expired", get(list_expired))
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
}
