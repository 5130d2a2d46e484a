use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use sitetrack_core::domain::user::{NewUser, User, UserId};

use super::{RepositoryError, UserRepository};
use crate::DbPool;

#[derive(Clone)]
pub struct SqlUserRepository {
    pool: DbPool,
}

impl SqlUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, RepositoryError> {
    Ok(User {
        id: UserId(row.try_get("id")?),
        name: row.try_get("name")?,
        phone_number: row.try_get("phone_number")?,
        password: row.try_get("password")?,
        role: row.try_get("role")?,
    })
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO users (name, phone_number, password, role) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.name)
        .bind(&user.phone_number)
        .bind(&user.password)
        .bind(&user.role)
        .execute(&self.pool)
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Duplicate("Phone number already registered".to_string())
            }
            other => RepositoryError::Database(other),
        })?;

        Ok(User {
            id: UserId(result.last_insert_rowid()),
            name: user.name,
            phone_number: user.phone_number,
            password: user.password,
            role: user.role,
        })
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, phone_number, password, role FROM users WHERE phone_number = ?",
        )
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }
}
