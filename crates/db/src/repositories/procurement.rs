use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;

use sitetrack_core::domain::indent::{IndentId, IndentStatus, MaterialIndent, NewIndent, Priority};
use sitetrack_core::domain::project::ProjectId;
use sitetrack_core::domain::quotation::{MaterialQuotation, NewQuotation, QuotationId};
use sitetrack_core::errors::ApplicationError;
use sitetrack_core::procurement::store::{already_approved, stale_indent, ProcurementStore};

use super::RepositoryError;
use crate::DbPool;

const INDENT_COLUMNS: &str =
    "id, project_id, item_name, quantity, priority, status, requested_by, date";
const QUOTATION_COLUMNS: &str = "id, indent_id, vendor_name, price, is_approved";

/// SQLite-backed indent ledger and quotation book.
///
/// Status changes are guarded updates inside a transaction; a guard that
/// matches no row rolls the whole unit back. Quotations are guarded only
/// against an `Approved` indent, approvals against the status that was read.
#[derive(Clone)]
pub struct SqlProcurementStore {
    pool: DbPool,
}

impl SqlProcurementStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn persistence(error: sqlx::Error) -> ApplicationError {
    RepositoryError::from(error).into()
}

fn indent_from_row(row: &SqliteRow) -> Result<MaterialIndent, RepositoryError> {
    let priority: String = row.try_get("priority")?;
    let status: String = row.try_get("status")?;

    Ok(MaterialIndent {
        id: IndentId(row.try_get("id")?),
        project_id: ProjectId(row.try_get("project_id")?),
        item_name: row.try_get("item_name")?,
        quantity: row.try_get("quantity")?,
        priority: Priority::from_str(&priority)
            .map_err(|_| RepositoryError::Decode(format!("invalid indent priority: {priority}")))?,
        status: IndentStatus::parse(&status)
            .ok_or_else(|| RepositoryError::Decode(format!("invalid indent status: {status}")))?,
        requested_by: row.try_get("requested_by")?,
        date: row.try_get("date")?,
    })
}

fn quotation_from_row(row: &SqliteRow) -> Result<MaterialQuotation, RepositoryError> {
    let price: String = row.try_get("price")?;

    Ok(MaterialQuotation {
        id: QuotationId(row.try_get("id")?),
        indent_id: IndentId(row.try_get("indent_id")?),
        vendor_name: row.try_get("vendor_name")?,
        price: Decimal::from_str(&price)
            .map_err(|error| RepositoryError::Decode(format!("invalid price `{price}`: {error}")))?,
        is_approved: row.try_get("is_approved")?,
    })
}

async fn indent_exists<'e, E>(executor: E, id: IndentId) -> Result<bool, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM material_indents WHERE id = ?")
        .bind(id.0)
        .fetch_one(executor)
        .await?;
    Ok(count > 0)
}

#[async_trait]
impl ProcurementStore for SqlProcurementStore {
    async fn insert_indent(&self, indent: NewIndent) -> Result<MaterialIndent, ApplicationError> {
        let result = sqlx::query(
            "INSERT INTO material_indents
                (project_id, item_name, quantity, priority, status, requested_by, date)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(indent.project_id.0)
        .bind(&indent.item_name)
        .bind(&indent.quantity)
        .bind(indent.priority.as_str())
        .bind(IndentStatus::Pending.as_str())
        .bind(&indent.requested_by)
        .bind(&indent.date)
        .execute(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(indent.into_indent(IndentId(result.last_insert_rowid())))
    }

    async fn find_indent(&self, id: IndentId) -> Result<Option<MaterialIndent>, ApplicationError> {
        let row = sqlx::query(&format!("SELECT {INDENT_COLUMNS} FROM material_indents WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence)?;

        Ok(row.as_ref().map(indent_from_row).transpose()?)
    }

    async fn list_indents(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<MaterialIndent>, ApplicationError> {
        let rows = sqlx::query(&format!(
            "SELECT {INDENT_COLUMNS} FROM material_indents WHERE project_id = ? ORDER BY id"
        ))
        .bind(project_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(rows.iter().map(indent_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn insert_quotation(
        &self,
        quotation: NewQuotation,
    ) -> Result<MaterialQuotation, ApplicationError> {
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let moved = sqlx::query("UPDATE material_indents SET status = ? WHERE id = ? AND status <> ?")
            .bind(IndentStatus::Quoted.as_str())
            .bind(quotation.indent_id.0)
            .bind(IndentStatus::Approved.as_str())
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;

        if moved.rows_affected() == 0 {
            if !indent_exists(&mut *tx, quotation.indent_id).await.map_err(persistence)? {
                return Err(ApplicationError::NotFound("Indent ID not found".to_string()));
            }
            warn!(
                event_name = "procurement.store.quotation_refused",
                indent_id = %quotation.indent_id,
                "indent was approved before the quotation landed; write refused"
            );
            return Err(already_approved(quotation.indent_id));
        }

        let inserted = sqlx::query(
            "INSERT INTO material_quotations (indent_id, vendor_name, price, is_approved)
             VALUES (?, ?, ?, 0)",
        )
        .bind(quotation.indent_id.0)
        .bind(&quotation.vendor_name)
        .bind(quotation.price.to_string())
        .execute(&mut *tx)
        .await
        .map_err(persistence)?;

        tx.commit().await.map_err(persistence)?;
        Ok(quotation.into_quotation(QuotationId(inserted.last_insert_rowid())))
    }

    async fn find_quotation(
        &self,
        id: QuotationId,
    ) -> Result<Option<MaterialQuotation>, ApplicationError> {
        let row =
            sqlx::query(&format!("SELECT {QUOTATION_COLUMNS} FROM material_quotations WHERE id = ?"))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(persistence)?;

        Ok(row.as_ref().map(quotation_from_row).transpose()?)
    }

    async fn list_quotations(
        &self,
        indent_id: IndentId,
    ) -> Result<Vec<MaterialQuotation>, ApplicationError> {
        let rows = sqlx::query(&format!(
            "SELECT {QUOTATION_COLUMNS} FROM material_quotations WHERE indent_id = ? ORDER BY id"
        ))
        .bind(indent_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(rows.iter().map(quotation_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn commit_approval(
        &self,
        indent_id: IndentId,
        quotation_id: QuotationId,
        expected: IndentStatus,
    ) -> Result<(), ApplicationError> {
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let moved = sqlx::query("UPDATE material_indents SET status = ? WHERE id = ? AND status = ?")
            .bind(IndentStatus::Approved.as_str())
            .bind(indent_id.0)
            .bind(expected.as_str())
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;

        if moved.rows_affected() == 0 {
            if !indent_exists(&mut *tx, indent_id).await.map_err(persistence)? {
                return Err(ApplicationError::NotFound("Indent not found".to_string()));
            }
            warn!(
                event_name = "procurement.store.stale_write",
                indent_id = %indent_id,
                expected = %expected,
                "indent changed since it was read; write refused"
            );
            return Err(stale_indent(indent_id, expected));
        }

        let flagged = sqlx::query(
            "UPDATE material_quotations SET is_approved = 1
             WHERE id = ? AND indent_id = ? AND is_approved = 0",
        )
        .bind(quotation_id.0)
        .bind(indent_id.0)
        .execute(&mut *tx)
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => ApplicationError::Conflict(
                format!("Indent {indent_id} already has an approved quotation"),
            ),
            other => persistence(other),
        })?;

        if flagged.rows_affected() == 0 {
            return Err(ApplicationError::NotFound("Quotation not found".to_string()));
        }

        tx.commit().await.map_err(persistence)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use sitetrack_core::audit::InMemoryAuditSink;
    use sitetrack_core::domain::indent::{IndentId, IndentStatus, NewIndent, Priority};
    use sitetrack_core::domain::project::ProjectId;
    use sitetrack_core::domain::quotation::{NewQuotation, QuotationId};
    use sitetrack_core::errors::ApplicationError;
    use sitetrack_core::procurement::{
        ApproveQuotation, ProcurementService, ProcurementStore, RaiseIndent, SubmitQuotation,
    };

    use super::SqlProcurementStore;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> SqlProcurementStore {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlProcurementStore::new(pool)
    }

    fn cement() -> NewIndent {
        NewIndent {
            project_id: ProjectId(1),
            item_name: "Cement".to_string(),
            quantity: "50 bags".to_string(),
            priority: Priority::High,
            requested_by: "Ramesh".to_string(),
            date: "2024-01-01".to_string(),
        }
    }

    fn acc(indent_id: IndentId) -> NewQuotation {
        NewQuotation { indent_id, vendor_name: "ACC".to_string(), price: Decimal::new(5005, 1) }
    }

    #[tokio::test]
    async fn indent_round_trips_and_lists_by_project() {
        let store = setup().await;
        let stored = store.insert_indent(cement()).await.expect("insert");
        let mut other = cement();
        other.project_id = ProjectId(2);
        store.insert_indent(other).await.expect("insert other");

        let found = store.find_indent(stored.id).await.expect("find").expect("exists");
        assert_eq!(found, stored);
        assert_eq!(found.status, IndentStatus::Pending);

        let listed = store.list_indents(ProjectId(1)).await.expect("list");
        assert_eq!(listed, vec![stored]);
        assert!(store.list_indents(ProjectId(3)).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn quotation_insert_moves_indent_to_quoted_and_keeps_price() {
        let store = setup().await;
        let indent = store.insert_indent(cement()).await.expect("insert");

        let quotation =
            store.insert_quotation(acc(indent.id)).await.expect("quote");

        let found = store.find_quotation(quotation.id).await.expect("find").expect("exists");
        assert_eq!(found.price, Decimal::new(5005, 1));
        assert!(!found.is_approved);
        let indent = store.find_indent(indent.id).await.expect("find").expect("exists");
        assert_eq!(indent.status, IndentStatus::Quoted);
    }

    #[tokio::test]
    async fn quotation_for_missing_indent_writes_nothing() {
        let store = setup().await;

        let error = store
            .insert_quotation(acc(IndentId(999)))
            .await
            .expect_err("missing indent");

        assert_eq!(error, ApplicationError::NotFound("Indent ID not found".to_string()));
        assert!(store.list_quotations(IndentId(999)).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn quoted_indent_takes_more_quotations_until_approved() {
        let store = setup().await;
        let indent = store.insert_indent(cement()).await.expect("insert");
        let first = store.insert_quotation(acc(indent.id)).await.expect("first quote");
        store.insert_quotation(acc(indent.id)).await.expect("second quote");
        store.commit_approval(indent.id, first.id, IndentStatus::Quoted).await.expect("approve");

        let error = store.insert_quotation(acc(indent.id)).await.expect_err("indent approved");

        assert_eq!(
            error,
            ApplicationError::Conflict(format!(
                "Indent {} is already Approved and cannot take new quotations",
                indent.id
            ))
        );
        assert_eq!(store.list_quotations(indent.id).await.expect("list").len(), 2);
        let after = store.find_indent(indent.id).await.expect("find").expect("exists");
        assert_eq!(after.status, IndentStatus::Approved);
    }

    #[tokio::test]
    async fn approval_with_unknown_quotation_rolls_back_indent_status() {
        let store = setup().await;
        let indent = store.insert_indent(cement()).await.expect("insert");
        store.insert_quotation(acc(indent.id)).await.expect("quote");

        let error = store
            .commit_approval(indent.id, QuotationId(77), IndentStatus::Quoted)
            .await
            .expect_err("unknown quotation");

        assert_eq!(error, ApplicationError::NotFound("Quotation not found".to_string()));
        let after = store.find_indent(indent.id).await.expect("find").expect("exists");
        assert_eq!(after.status, IndentStatus::Quoted);
    }

    #[tokio::test]
    async fn approval_flags_exactly_one_quotation() {
        let store = setup().await;
        let indent = store.insert_indent(cement()).await.expect("insert");
        let first =
            store.insert_quotation(acc(indent.id)).await.expect("quote");
        let second =
            store.insert_quotation(acc(indent.id)).await.expect("quote");

        store.commit_approval(indent.id, first.id, IndentStatus::Quoted).await.expect("approve");
        let error = store
            .commit_approval(indent.id, second.id, IndentStatus::Quoted)
            .await
            .expect_err("already approved");
        assert!(matches!(error, ApplicationError::Conflict(_)));

        let approved: Vec<_> = store
            .list_quotations(indent.id)
            .await
            .expect("list")
            .into_iter()
            .filter(|quotation| quotation.is_approved)
            .map(|quotation| quotation.id)
            .collect();
        assert_eq!(approved, vec![first.id]);
    }

    #[tokio::test]
    async fn service_runs_cement_scenario_against_sqlite() {
        let sink = InMemoryAuditSink::default();
        let service = ProcurementService::new(setup().await, Arc::new(sink.clone()));

        let indent = service
            .create_indent(
                RaiseIndent {
                    project_id: ProjectId(1),
                    item_name: "Cement".to_string(),
                    quantity: "50 bags".to_string(),
                    priority: Some("High".to_string()),
                    requested_by: "Ramesh".to_string(),
                    date: "2024-01-01".to_string(),
                },
                "req-1",
            )
            .await
            .expect("create");
        let quotation = service
            .add_quotation(
                SubmitQuotation {
                    indent_id: indent.id,
                    vendor_name: "ACC".to_string(),
                    price: Decimal::new(500, 0),
                },
                "req-2",
            )
            .await
            .expect("quote");
        let confirmation = service
            .approve(
                ApproveQuotation { indent_id: indent.id, selected_quotation_id: quotation.id },
                "req-3",
            )
            .await
            .expect("approve");

        assert_eq!(confirmation.message(), "Approved vendor ACC for Cement");
        let stored = service.store().find_indent(indent.id).await.expect("find").expect("exists");
        assert_eq!(stored.status, IndentStatus::Approved);
        assert_eq!(sink.events().len(), 3);
    }
}
