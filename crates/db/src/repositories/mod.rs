use async_trait::async_trait;
use thiserror::Error;

use sitetrack_core::domain::project::{NewProject, Project, ProjectId};
use sitetrack_core::domain::report::{
    ProgressReport, ProgressReportFields, ProgressReportId, WorkReport, WorkReportFields,
    WorkReportId,
};
use sitetrack_core::domain::user::{NewUser, User};
use sitetrack_core::errors::ApplicationError;

pub mod procurement;
pub mod project;
pub mod report;
pub mod user;

pub use procurement::SqlProcurementStore;
pub use project::SqlProjectRepository;
pub use report::SqlReportRepository;
pub use user::SqlUserRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("{0}")]
    Duplicate(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Duplicate(message) => Self::InvalidInput(message),
            other => Self::Persistence(other.to_string()),
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`RepositoryError::Duplicate`] when the phone number is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, RepositoryError>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, project: NewProject) -> Result<Project, RepositoryError>;
    async fn list(&self) -> Result<Vec<Project>, RepositoryError>;
    async fn exists(&self, id: ProjectId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn add_work_report(
        &self,
        project_id: Option<ProjectId>,
        fields: WorkReportFields,
    ) -> Result<WorkReport, RepositoryError>;

    /// Newest entry first.
    async fn list_work_reports(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<WorkReport>, RepositoryError>;

    /// Returns `false` when no entry has this id.
    async fn update_work_report(
        &self,
        entry_id: WorkReportId,
        fields: WorkReportFields,
    ) -> Result<bool, RepositoryError>;

    /// Returns `false` when no entry has this id.
    async fn delete_work_report(&self, entry_id: WorkReportId) -> Result<bool, RepositoryError>;

    async fn add_progress_report(
        &self,
        project_id: ProjectId,
        fields: ProgressReportFields,
    ) -> Result<ProgressReportId, RepositoryError>;

    async fn list_progress_reports(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ProgressReport>, RepositoryError>;
}
