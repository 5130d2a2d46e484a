use crate::connection::DbPool;
use crate::repositories::RepositoryError;

const DEMO_PROJECTS: &[(&str, &str)] = &[
    ("Metro Station Phase 1", "Chennai Central"),
    ("Highway Expansion", "Bangalore North"),
    ("Tech Park Site B", "Hyderabad"),
];

const DEMO_USER_NAME: &str = "Ramesh Site";
pub const DEMO_USER_PHONE: &str = "9999999999";

/// Demo dataset for a fresh install: three sample projects and one site
/// engineer login.
pub struct DemoSeed;

impl DemoSeed {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_seed.sql");

    /// Loads the dataset. Running it twice leaves the database unchanged.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let projects_before = count(pool, "SELECT COUNT(*) FROM projects").await?;
        let users_before = count(pool, "SELECT COUNT(*) FROM users").await?;

        let mut tx = pool.begin().await?;
        sqlx::query(Self::SQL).execute(&mut *tx).await?;
        tx.commit().await?;

        let projects_after = count(pool, "SELECT COUNT(*) FROM projects").await?;
        let users_after = count(pool, "SELECT COUNT(*) FROM users").await?;

        Ok(SeedResult {
            projects_added: projects_after - projects_before,
            users_added: users_after - users_before,
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for &(name, location) in DEMO_PROJECTS {
            let present: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM projects WHERE project_name = ?1 AND location = ?2)",
            )
            .bind(name)
            .bind(location)
            .fetch_one(pool)
            .await?;
            checks.push((name, present == 1));
        }

        let user_present: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE phone_number = ?1 AND name = ?2)",
        )
        .bind(DEMO_USER_PHONE)
        .bind(DEMO_USER_NAME)
        .fetch_one(pool)
        .await?;
        checks.push((DEMO_USER_NAME, user_present == 1));

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }
}

async fn count(pool: &DbPool, sql: &str) -> Result<i64, RepositoryError> {
    Ok(sqlx::query_scalar(sql).fetch_one(pool).await?)
}

#[derive(Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub projects_added: i64,
    pub users_added: i64,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
