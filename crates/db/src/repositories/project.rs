use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use sitetrack_core::domain::project::{NewProject, Project, ProjectId};

use super::{ProjectRepository, RepositoryError};
use crate::DbPool;

#[derive(Clone)]
pub struct SqlProjectRepository {
    pool: DbPool,
}

impl SqlProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn project_from_row(row: &SqliteRow) -> Result<Project, RepositoryError> {
    Ok(Project {
        project_id: ProjectId(row.try_get("project_id")?),
        project_name: row.try_get("project_name")?,
        location: row.try_get("location")?,
    })
}

#[async_trait]
impl ProjectRepository for SqlProjectRepository {
    async fn create(&self, project: NewProject) -> Result<Project, RepositoryError> {
        let result = sqlx::query("INSERT INTO projects (project_name, location) VALUES (?, ?)")
            .bind(&project.project_name)
            .bind(&project.location)
            .execute(&self.pool)
            .await?;

        Ok(Project {
            project_id: ProjectId(result.last_insert_rowid()),
            project_name: project.project_name,
            location: project.location,
        })
    }

    async fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT project_id, project_name, location FROM projects ORDER BY project_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(project_from_row).collect()
    }

    async fn exists(&self, id: ProjectId) -> Result<bool, RepositoryError> {
        let found: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM projects WHERE project_id = ?)")
                .bind(id.0)
                .fetch_one(&self.pool)
                .await?;
        Ok(found == 1)
    }
}
