use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Versions recorded in `_sqlx_migrations`, oldest first. Empty on a fresh
/// database.
pub async fn applied_versions(pool: &DbPool) -> Result<Vec<i64>, sqlx::Error> {
    let table_exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if table_exists == 0 {
        return Ok(Vec::new());
    }

    sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = 1 ORDER BY version")
        .fetch_all(pool)
        .await
}

/// Number of bundled migrations not yet applied.
pub async fn pending_count(pool: &DbPool) -> Result<usize, sqlx::Error> {
    let applied = applied_versions(pool).await?;
    Ok(MIGRATOR
        .iter()
        .filter(|migration| migration.migration_type.is_up_migration())
        .filter(|migration| !applied.contains(&migration.version))
        .count())
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::{applied_versions, pending_count, run_pending};
    use crate::{connect_with_settings, migrations::MIGRATOR};

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &[
        "users",
        "projects",
        "material_indents",
        "material_quotations",
        "dwr_entries",
        "dpr_entries",
        "idx_projects_project_name",
        "idx_material_indents_project_id",
        "idx_material_quotations_indent_id",
        "idx_material_quotations_one_approved",
        "idx_dwr_entries_project_id",
        "idx_dpr_entries_project_id",
    ];

    async fn table_count(pool: &sqlx::SqlitePool, name: &str) -> i64 {
        sqlx::query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("query sqlite_master")
        .get::<i64, _>("count")
    }

    #[tokio::test]
    async fn migrations_create_baseline_tables() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        assert_eq!(pending_count(&pool).await.expect("pending before"), 1);

        run_pending(&pool).await.expect("run migrations");

        for table in
            ["users", "projects", "material_indents", "material_quotations", "dwr_entries", "dpr_entries"]
        {
            assert_eq!(table_count(&pool, table).await, 1, "missing table {table}");
        }
        assert_eq!(pending_count(&pool).await.expect("pending after"), 0);
        assert_eq!(applied_versions(&pool).await.expect("versions").len(), 1);
    }

    #[tokio::test]
    async fn migrations_are_reversible() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");

        assert_eq!(table_count(&pool, "material_indents").await, 0);
        assert_eq!(table_count(&pool, "users").await, 0);
    }

    #[tokio::test]
    async fn migrations_up_down_up_preserves_schema_signature() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let initial_signature = managed_schema_signature(&pool).await;
        assert_eq!(
            initial_signature.len(),
            MANAGED_SCHEMA_OBJECTS.len(),
            "initial migration pass should create all managed schema objects",
        );

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");
        assert!(
            managed_schema_signature(&pool).await.is_empty(),
            "managed schema objects should be removed after full undo",
        );

        run_pending(&pool).await.expect("re-run migrations");
        assert_eq!(
            managed_schema_signature(&pool).await,
            initial_signature,
            "up/down/up should preserve migration-managed schema signature",
        );
    }

    async fn managed_schema_signature(pool: &sqlx::SqlitePool) -> Vec<(String, String, String)> {
        let mut signature: Vec<(String, String, String)> = sqlx::query(
            "SELECT type, name, IFNULL(sql, '') AS sql
             FROM sqlite_master
             WHERE type IN ('table', 'index')",
        )
        .fetch_all(pool)
        .await
        .expect("load schema objects")
        .into_iter()
        .filter_map(|row| {
            let name = row.get::<String, _>("name");
            MANAGED_SCHEMA_OBJECTS
                .contains(&name.as_str())
                .then(|| (row.get::<String, _>("type"), name, row.get::<String, _>("sql")))
        })
        .collect();
        signature.sort();
        signature
    }
}
