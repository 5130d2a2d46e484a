use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::project::ProjectId;
use crate::errors::ApplicationError;

/// Roles that may file a daily progress report. Matched exactly as sent by the
/// mobile client.
pub const PROGRESS_REPORT_ROLES: &[&str] = &["Admin", "MD", "Site Engineer", "Site In-charge"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkReportId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressReportId(pub i64);

/// Editable fields of a daily work report (DWR).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkReportFields {
    pub user_name: String,
    pub description: String,
    pub location_work: String,
    pub quantity: String,
    pub subcontractor: String,
    pub site_incharge: String,
    pub remarks: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkReport {
    pub entry_id: WorkReportId,
    pub project_id: Option<ProjectId>,
    #[serde(flatten)]
    pub fields: WorkReportFields,
    pub entry_date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReportFields {
    pub user_name: String,
    pub user_role: String,
    pub date: String,
    pub description: String,
    pub location: String,
    pub finished_qty: String,
    pub planned_qty: String,
    pub unit: String,
    pub percentage_done: String,
    pub subcontractor: String,
    pub site_engineer: String,
    pub site_incharge: String,
    pub reason_incompletion: String,
}

impl ProgressReportFields {
    pub fn ensure_role_may_file(&self) -> Result<(), ApplicationError> {
        if PROGRESS_REPORT_ROLES.contains(&self.user_role.as_str()) {
            return Ok(());
        }
        Err(ApplicationError::Forbidden(
            "Access Denied: You do not have permission to create DPRs.".to_string(),
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub id: ProgressReportId,
    pub project_id: ProjectId,
    #[serde(flatten)]
    pub fields: ProgressReportFields,
}
