use axum::{extract::State, routing::get, routing::post, Json, Router};
use serde::Serialize;
use sitetrack_core::domain::project::{NewProject, Project};
use sitetrack_core::errors::ApplicationError;
use sitetrack_db::ProjectRepository;
use tracing::info;

use crate::app::AppState;
use crate::error::{ApiError, CorrelationId};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create_project", post(create_project))
        .route("/projects", post(create_project).get(list_projects))
        .route("/get_projects", get(list_projects))
}

#[derive(Debug, Serialize)]
pub struct ProjectCreated {
    pub message: &'static str,
    pub project_id: i64,
}

pub async fn create_project(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(request): Json<NewProject>,
) -> Result<Json<ProjectCreated>, ApiError> {
    if request.project_name.trim().is_empty() {
        return Err(correlation_id
            .fail(ApplicationError::InvalidInput("project_name is required".to_string())));
    }

    let project =
        state.projects.create(request).await.map_err(|error| correlation_id.fail(error))?;

    info!(
        event_name = "records.project.created",
        correlation_id = %correlation_id.as_str(),
        project_id = %project.project_id,
        "project created"
    );

    Ok(Json(ProjectCreated {
        message: "Project created successfully!",
        project_id: project.project_id.0,
    }))
}

pub async fn list_projects(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
) -> Result<Json<Vec<Project>>, ApiError> {
    state.projects.list().await.map(Json).map_err(|error| correlation_id.fail(error))
}
