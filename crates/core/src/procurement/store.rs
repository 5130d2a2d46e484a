use async_trait::async_trait;

use crate::domain::indent::{IndentId, IndentStatus, MaterialIndent, NewIndent};
use crate::domain::project::ProjectId;
use crate::domain::quotation::{MaterialQuotation, NewQuotation, QuotationId};
use crate::errors::ApplicationError;

/// Persistence seam for the indent ledger and quotation book.
///
/// The two write paths that touch more than one row (`insert_quotation` and
/// `commit_approval`) must be atomic and fail with
/// [`ApplicationError::Conflict`] without writing anything. `insert_quotation`
/// refuses only an indent that is already `Approved`; any number of
/// quotations may land on a `Pending` or `Quoted` indent. `commit_approval`
/// refuses an indent that is no longer in the `expected` status.
#[async_trait]
pub trait ProcurementStore: Send + Sync {
    async fn insert_indent(&self, indent: NewIndent) -> Result<MaterialIndent, ApplicationError>;

    async fn find_indent(&self, id: IndentId) -> Result<Option<MaterialIndent>, ApplicationError>;

    async fn list_indents(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<MaterialIndent>, ApplicationError>;

    /// Stores the quotation and moves its indent to `Quoted`.
    async fn insert_quotation(
        &self,
        quotation: NewQuotation,
    ) -> Result<MaterialQuotation, ApplicationError>;

    async fn find_quotation(
        &self,
        id: QuotationId,
    ) -> Result<Option<MaterialQuotation>, ApplicationError>;

    async fn list_quotations(
        &self,
        indent_id: IndentId,
    ) -> Result<Vec<MaterialQuotation>, ApplicationError>;

    /// Flags the quotation approved and moves the indent from `expected` to
    /// `Approved`.
    async fn commit_approval(
        &self,
        indent_id: IndentId,
        quotation_id: QuotationId,
        expected: IndentStatus,
    ) -> Result<(), ApplicationError>;
}

pub fn stale_indent(indent_id: IndentId, expected: IndentStatus) -> ApplicationError {
    ApplicationError::Conflict(format!(
        "indent {indent_id} changed concurrently (expected status {expected})"
    ))
}

pub fn already_approved(indent_id: IndentId) -> ApplicationError {
    ApplicationError::Conflict(format!(
        "Indent {indent_id} is already Approved and cannot take new quotations"
    ))
}
