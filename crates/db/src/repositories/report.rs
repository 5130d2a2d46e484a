use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use sitetrack_core::domain::project::ProjectId;
use sitetrack_core::domain::report::{
    ProgressReport, ProgressReportFields, ProgressReportId, WorkReport, WorkReportFields,
    WorkReportId,
};

use super::{ReportRepository, RepositoryError};
use crate::DbPool;

/// Daily work (DWR) and daily progress (DPR) report storage.
#[derive(Clone)]
pub struct SqlReportRepository {
    pool: DbPool,
}

impl SqlReportRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn work_report_from_row(row: &SqliteRow) -> Result<WorkReport, RepositoryError> {
    let entry_date: String = row.try_get("entry_date")?;
    Ok(WorkReport {
        entry_id: WorkReportId(row.try_get("entry_id")?),
        project_id: row.try_get::<Option<i64>, _>("project_id")?.map(ProjectId),
        fields: WorkReportFields {
            user_name: row.try_get("user_name")?,
            description: row.try_get("description")?,
            location_work: row.try_get("location_work")?,
            quantity: row.try_get("quantity")?,
            subcontractor: row.try_get("subcontractor")?,
            site_incharge: row.try_get("site_incharge")?,
            remarks: row.try_get("remarks")?,
        },
        entry_date: NaiveDate::parse_from_str(&entry_date, "%Y-%m-%d").map_err(|error| {
            RepositoryError::Decode(format!("invalid dwr entry_date `{entry_date}`: {error}"))
        })?,
    })
}

fn progress_report_from_row(row: &SqliteRow) -> Result<ProgressReport, RepositoryError> {
    Ok(ProgressReport {
        id: ProgressReportId(row.try_get("id")?),
        project_id: ProjectId(row.try_get("project_id")?),
        fields: ProgressReportFields {
            user_name: row.try_get("user_name")?,
            user_role: row.try_get("user_role")?,
            date: row.try_get("date")?,
            description: row.try_get("description")?,
            location: row.try_get("location")?,
            finished_qty: row.try_get("finished_qty")?,
            planned_qty: row.try_get("planned_qty")?,
            unit: row.try_get("unit")?,
            percentage_done: row.try_get("percentage_done")?,
            subcontractor: row.try_get("subcontractor")?,
            site_engineer: row.try_get("site_engineer")?,
            site_incharge: row.try_get("site_incharge")?,
            reason_incompletion: row.try_get("reason_incompletion")?,
        },
    })
}

#[async_trait]
impl ReportRepository for SqlReportRepository {
    async fn add_work_report(
        &self,
        project_id: Option<ProjectId>,
        fields: WorkReportFields,
    ) -> Result<WorkReport, RepositoryError> {
        let entry_date = Utc::now().date_naive();
        let result = sqlx::query(
            "INSERT INTO dwr_entries
                (project_id, user_name, description, location_work, quantity,
                 subcontractor, site_incharge, remarks, entry_date)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(project_id.map(|id| id.0))
        .bind(&fields.user_name)
        .bind(&fields.description)
        .bind(&fields.location_work)
        .bind(&fields.quantity)
        .bind(&fields.subcontractor)
        .bind(&fields.site_incharge)
        .bind(&fields.remarks)
        .bind(entry_date.format("%Y-%m-%d").to_string())
        .execute(&self.pool)
        .await?;

        Ok(WorkReport {
            entry_id: WorkReportId(result.last_insert_rowid()),
            project_id,
            fields,
            entry_date,
        })
    }

    async fn list_work_reports(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<WorkReport>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT entry_id, project_id, user_name, description, location_work, quantity,
                    subcontractor, site_incharge, remarks, entry_date
             FROM dwr_entries
             WHERE project_id = ?
             ORDER BY entry_id DESC",
        )
        .bind(project_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(work_report_from_row).collect()
    }

    async fn update_work_report(
        &self,
        entry_id: WorkReportId,
        fields: WorkReportFields,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE dwr_entries
             SET user_name = ?, description = ?, location_work = ?, quantity = ?,
                 subcontractor = ?, site_incharge = ?, remarks = ?
             WHERE entry_id = ?",
        )
        .bind(&fields.user_name)
        .bind(&fields.description)
        .bind(&fields.location_work)
        .bind(&fields.quantity)
        .bind(&fields.subcontractor)
        .bind(&fields.site_incharge)
        .bind(&fields.remarks)
        .bind(entry_id.0)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_work_report(&self, entry_id: WorkReportId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM dwr_entries WHERE entry_id = ?")
            .bind(entry_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_progress_report(
        &self,
        project_id: ProjectId,
        fields: ProgressReportFields,
    ) -> Result<ProgressReportId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO dpr_entries
                (project_id, user_name, user_role, date, description, location,
                 finished_qty, planned_qty, unit, percentage_done,
                 subcontractor, site_engineer, site_incharge, reason_incompletion)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(project_id.0)
        .bind(&fields.user_name)
        .bind(&fields.user_role)
        .bind(&fields.date)
        .bind(&fields.description)
        .bind(&fields.location)
        .bind(&fields.finished_qty)
        .bind(&fields.planned_qty)
        .bind(&fields.unit)
        .bind(&fields.percentage_done)
        .bind(&fields.subcontractor)
        .bind(&fields.site_engineer)
        .bind(&fields.site_incharge)
        .bind(&fields.reason_incompletion)
        .execute(&self.pool)
        .await?;

        Ok(ProgressReportId(result.last_insert_rowid()))
    }

    async fn list_progress_reports(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ProgressReport>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, project_id, user_name, user_role, date, description, location,
                    finished_qty, planned_qty, unit, percentage_done,
                    subcontractor, site_engineer, site_incharge, reason_incompletion
             FROM dpr_entries
             WHERE project_id = ?
             ORDER BY id",
        )
        .bind(project_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(progress_report_from_row).collect()
    }
}
