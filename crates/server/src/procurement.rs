use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use sitetrack_core::domain::indent::{IndentId, MaterialIndent};
use sitetrack_core::domain::project::ProjectId;
use sitetrack_core::domain::quotation::MaterialQuotation;
use sitetrack_core::procurement::{ApproveQuotation, RaiseIndent, SubmitQuotation};

use crate::app::AppState;
use crate::error::{ApiError, CorrelationId};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create_indent", post(create_indent))
        .route("/get_indents/{project_id}", get(list_indents))
        .route("/add_quotation", post(add_quotation))
        .route("/get_quotes/{indent_id}", get(list_quotations))
        .route("/approve_indent", post(approve_indent))
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub message: &'static str,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct Approved {
    pub message: String,
    pub already_approved: bool,
}

pub async fn create_indent(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(request): Json<RaiseIndent>,
) -> Result<Json<Created>, ApiError> {
    let indent = state
        .procurement
        .create_indent(request, correlation_id.as_str())
        .await
        .map_err(|error| correlation_id.fail(error))?;

    Ok(Json(Created { message: "Indent raised successfully", id: indent.id.0 }))
}

pub async fn list_indents(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Path(project_id): Path<i64>,
) -> Result<Json<Vec<MaterialIndent>>, ApiError> {
    state
        .procurement
        .list_indents(ProjectId(project_id))
        .await
        .map(Json)
        .map_err(|error| correlation_id.fail(error))
}

pub async fn add_quotation(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(request): Json<SubmitQuotation>,
) -> Result<Json<Created>, ApiError> {
    let quotation = state
        .procurement
        .add_quotation(request, correlation_id.as_str())
        .await
        .map_err(|error| correlation_id.fail(error))?;

    Ok(Json(Created { message: "Quotation added successfully", id: quotation.id.0 }))
}

pub async fn list_quotations(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Path(indent_id): Path<i64>,
) -> Result<Json<Vec<MaterialQuotation>>, ApiError> {
    state
        .procurement
        .list_quotations(IndentId(indent_id))
        .await
        .map(Json)
        .map_err(|error| correlation_id.fail(error))
}

pub async fn approve_indent(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(request): Json<ApproveQuotation>,
) -> Result<Json<Approved>, ApiError> {
    let confirmation = state
        .procurement
        .approve(request, correlation_id.as_str())
        .await
        .map_err(|error| correlation_id.fail(error))?;

    Ok(Json(Approved {
        message: confirmation.message(),
        already_approved: confirmation.already_approved,
    }))
}
