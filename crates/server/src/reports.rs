//! Daily work (DWR) and daily progress (DPR) report endpoints.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sitetrack_core::domain::project::ProjectId;
use sitetrack_core::domain::report::{
    ProgressReport, ProgressReportFields, WorkReport, WorkReportFields, WorkReportId,
};
use sitetrack_core::errors::ApplicationError;
use sitetrack_db::{ProjectRepository, ReportRepository};
use tracing::{info, warn};

use crate::app::AppState;
use crate::error::{ApiError, CorrelationId};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/add-dwr", post(add_work_report))
        .route("/get-dwr/{project_id}", get(list_work_reports))
        .route("/update_dwr/{entry_id}", put(update_work_report))
        .route("/delete_dwr/{entry_id}", delete(delete_work_report))
        .route("/add-dpr", post(add_progress_report))
        .route("/get-dpr/{project_id}", get(list_progress_reports))
}

#[derive(Debug, Deserialize)]
pub struct WorkReportRequest {
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(flatten)]
    pub fields: WorkReportFields,
}

#[derive(Debug, Deserialize)]
pub struct ProgressReportRequest {
    pub project_id: ProjectId,
    #[serde(flatten)]
    pub fields: ProgressReportFields,
}

#[derive(Debug, Serialize)]
pub struct Saved {
    pub message: &'static str,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct Acknowledged {
    pub message: &'static str,
}

/// One line of the DWR register as the mobile client renders it.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct WorkReportRow {
    pub sno: String,
    pub entry_id: i64,
    pub desc: String,
    pub location: String,
    pub quantity: String,
    pub subcontractor: String,
    pub engineer: String,
    pub incharge: String,
    pub remarks: String,
    pub date: String,
}

impl WorkReportRow {
    fn numbered(position: usize, report: WorkReport) -> Self {
        Self {
            sno: (position + 1).to_string(),
            entry_id: report.entry_id.0,
            desc: report.fields.description,
            location: report.fields.location_work,
            quantity: report.fields.quantity,
            subcontractor: report.fields.subcontractor,
            engineer: report.fields.user_name,
            incharge: report.fields.site_incharge,
            remarks: report.fields.remarks,
            date: report.entry_date.format("%Y-%m-%d").to_string(),
        }
    }
}

async fn require_project(
    state: &AppState,
    correlation_id: &CorrelationId,
    project_id: ProjectId,
) -> Result<(), ApiError> {
    let exists =
        state.projects.exists(project_id).await.map_err(|error| correlation_id.fail(error))?;
    if exists {
        return Ok(());
    }
    Err(correlation_id.fail(ApplicationError::NotFound("Project not found".to_string())))
}

pub async fn add_work_report(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(request): Json<WorkReportRequest>,
) -> Result<Json<Saved>, ApiError> {
    if let Some(project_id) = request.project_id {
        require_project(&state, &correlation_id, project_id).await?;
    }

    let report = state
        .reports
        .add_work_report(request.project_id, request.fields)
        .await
        .map_err(|error| correlation_id.fail(error))?;

    info!(
        event_name = "records.dwr.created",
        correlation_id = %correlation_id.as_str(),
        entry_id = report.entry_id.0,
        "daily work report saved"
    );

    Ok(Json(Saved { message: "DWR Saved Successfully", id: report.entry_id.0 }))
}

pub async fn list_work_reports(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Path(project_id): Path<i64>,
) -> Result<Json<Vec<WorkReportRow>>, ApiError> {
    let reports = state
        .reports
        .list_work_reports(ProjectId(project_id))
        .await
        .map_err(|error| correlation_id.fail(error))?;

    Ok(Json(
        reports
            .into_iter()
            .enumerate()
            .map(|(position, report)| WorkReportRow::numbered(position, report))
            .collect(),
    ))
}

pub async fn update_work_report(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Path(entry_id): Path<i64>,
    Json(request): Json<WorkReportRequest>,
) -> Result<Json<Acknowledged>, ApiError> {
    let updated = state
        .reports
        .update_work_report(WorkReportId(entry_id), request.fields)
        .await
        .map_err(|error| correlation_id.fail(error))?;
    if !updated {
        return Err(correlation_id.fail(ApplicationError::NotFound("Entry not found".to_string())));
    }

    info!(
        event_name = "records.dwr.updated",
        correlation_id = %correlation_id.as_str(),
        entry_id,
        "daily work report updated"
    );
    Ok(Json(Acknowledged { message: "DWR updated successfully" }))
}

pub async fn delete_work_report(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Path(entry_id): Path<i64>,
) -> Result<Json<Acknowledged>, ApiError> {
    let deleted = state
        .reports
        .delete_work_report(WorkReportId(entry_id))
        .await
        .map_err(|error| correlation_id.fail(error))?;
    if !deleted {
        return Err(correlation_id.fail(ApplicationError::NotFound("Entry not found".to_string())));
    }

    info!(
        event_name = "records.dwr.deleted",
        correlation_id = %correlation_id.as_str(),
        entry_id,
        "daily work report deleted"
    );
    Ok(Json(Acknowledged { message: "DWR deleted successfully" }))
}

pub async fn add_progress_report(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(request): Json<ProgressReportRequest>,
) -> Result<Json<Saved>, ApiError> {
    request.fields.ensure_role_may_file().map_err(|error| {
        warn!(
            event_name = "records.dpr.denied",
            correlation_id = %correlation_id.as_str(),
            user_role = %request.fields.user_role,
            "progress report refused for role"
        );
        correlation_id.fail(error)
    })?;
    require_project(&state, &correlation_id, request.project_id).await?;

    let id = state
        .reports
        .add_progress_report(request.project_id, request.fields)
        .await
        .map_err(|error| correlation_id.fail(error))?;

    info!(
        event_name = "records.dpr.created",
        correlation_id = %correlation_id.as_str(),
        dpr_id = id.0,
        project_id = %request.project_id,
        "daily progress report saved"
    );
    Ok(Json(Saved { message: "DPR Saved Successfully", id: id.0 }))
}

pub async fn list_progress_reports(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Path(project_id): Path<i64>,
) -> Result<Json<Vec<ProgressReport>>, ApiError> {
    state
        .reports
        .list_progress_reports(ProjectId(project_id))
        .await
        .map(Json)
        .map_err(|error| correlation_id.fail(error))
}
