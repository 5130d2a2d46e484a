//! Material procurement workflow: indent -> quotation -> approval.
//!
//! [`ProcurementService`] owns the business rules and drives a
//! [`ProcurementStore`]. An indent moves `Pending -> Quoted -> Approved` and
//! never backwards; exactly one quotation per indent ends up approved.

pub mod memory;
pub mod store;

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::indent::{IndentId, IndentStatus, MaterialIndent, NewIndent, Priority};
use crate::domain::project::ProjectId;
use crate::domain::quotation::{MaterialQuotation, NewQuotation, QuotationId};
use crate::errors::ApplicationError;

pub use memory::InMemoryProcurementStore;
pub use store::ProcurementStore;

/// Request raised by a site engineer.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RaiseIndent {
    pub project_id: ProjectId,
    pub item_name: String,
    pub quantity: String,
    #[serde(default)]
    pub priority: Option<String>,
    pub requested_by: String,
    pub date: String,
}

/// Vendor offer submitted against an indent.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SubmitQuotation {
    pub indent_id: IndentId,
    pub vendor_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct ApproveQuotation {
    pub indent_id: IndentId,
    pub selected_quotation_id: QuotationId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ApprovalConfirmation {
    pub indent_id: IndentId,
    pub quotation_id: QuotationId,
    pub vendor_name: String,
    pub item_name: String,
    /// True when the indent was already approved with this quotation and
    /// nothing was written.
    pub already_approved: bool,
}

impl ApprovalConfirmation {
    pub fn message(&self) -> String {
        format!("Approved vendor {} for {}", self.vendor_name, self.item_name)
    }
}

pub struct ProcurementService<S> {
    store: S,
    audit: Arc<dyn AuditSink>,
}

impl<S> ProcurementService<S>
where
    S: ProcurementStore,
{
    pub fn new(store: S, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records a new indent. The project reference is taken as given; callers
    /// that need it checked must do so themselves.
    pub async fn create_indent(
        &self,
        request: RaiseIndent,
        correlation_id: &str,
    ) -> Result<MaterialIndent, ApplicationError> {
        let priority = match request.priority.as_deref() {
            None => Priority::default(),
            Some(raw) if raw.trim().is_empty() => Priority::default(),
            Some(raw) => raw.parse::<Priority>()?,
        };
        require_text("item_name", &request.item_name)?;
        require_text("requested_by", &request.requested_by)?;

        let indent = self
            .store
            .insert_indent(NewIndent {
                project_id: request.project_id,
                item_name: request.item_name,
                quantity: request.quantity,
                priority,
                requested_by: request.requested_by,
                date: request.date,
            })
            .await?;

        info!(
            event_name = "procurement.indent.raised",
            correlation_id = %correlation_id,
            indent_id = %indent.id,
            project_id = %indent.project_id,
            priority = %indent.priority,
            "material indent raised"
        );
        self.audit.emit(
            AuditEvent::new(
                Some(indent.id),
                correlation_id,
                "procurement.indent.raised",
                AuditCategory::Indent,
                indent.requested_by.clone(),
                AuditOutcome::Success,
            )
            .with_metadata("item_name", indent.item_name.clone())
            .with_metadata("priority", indent.priority.as_str()),
        );

        Ok(indent)
    }

    pub async fn list_indents(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<MaterialIndent>, ApplicationError> {
        self.store.list_indents(project_id).await
    }

    pub async fn add_quotation(
        &self,
        request: SubmitQuotation,
        correlation_id: &str,
    ) -> Result<MaterialQuotation, ApplicationError> {
        let indent = self
            .store
            .find_indent(request.indent_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound("Indent ID not found".to_string()))?;

        let quotation = NewQuotation {
            indent_id: indent.id,
            vendor_name: request.vendor_name,
            price: request.price,
        };
        quotation.validate()?;
        require_text("vendor_name", &quotation.vendor_name)?;

        let mut next = indent.clone();
        if let Err(error) = next.transition_to(IndentStatus::Quoted) {
            warn!(
                event_name = "procurement.quotation.rejected",
                correlation_id = %correlation_id,
                indent_id = %indent.id,
                status = %indent.status,
                "quotation refused for indent that can no longer be quoted"
            );
            self.audit.emit(
                AuditEvent::new(
                    Some(indent.id),
                    correlation_id,
                    "procurement.quotation.rejected",
                    AuditCategory::Quotation,
                    quotation.vendor_name.clone(),
                    AuditOutcome::Rejected,
                )
                .with_metadata("status", indent.status.as_str()),
            );
            return Err(ApplicationError::Conflict(format!(
                "Indent {} is already {} and cannot take new quotations ({error})",
                indent.id, indent.status
            )));
        }

        let stored = self.store.insert_quotation(quotation).await?;

        info!(
            event_name = "procurement.quotation.added",
            correlation_id = %correlation_id,
            indent_id = %indent.id,
            quotation_id = %stored.id,
            vendor_name = %stored.vendor_name,
            "quotation added to indent"
        );
        self.audit.emit(
            AuditEvent::new(
                Some(indent.id),
                correlation_id,
                "procurement.quotation.added",
                AuditCategory::Quotation,
                stored.vendor_name.clone(),
                AuditOutcome::Success,
            )
            .with_metadata("quotation_id", stored.id.to_string())
            .with_metadata("price", stored.price.to_string())
            .with_metadata("from", indent.status.as_str())
            .with_metadata("to", IndentStatus::Quoted.as_str()),
        );

        Ok(stored)
    }

    pub async fn list_quotations(
        &self,
        indent_id: IndentId,
    ) -> Result<Vec<MaterialQuotation>, ApplicationError> {
        self.store.list_quotations(indent_id).await
    }

    pub async fn approve(
        &self,
        request: ApproveQuotation,
        correlation_id: &str,
    ) -> Result<ApprovalConfirmation, ApplicationError> {
        let indent = self
            .store
            .find_indent(request.indent_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound("Indent not found".to_string()))?;
        let quotation = self
            .store
            .find_quotation(request.selected_quotation_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound("Quotation not found".to_string()))?;

        if !quotation.belongs_to(indent.id) {
            self.reject_approval(&indent, &quotation, correlation_id, "foreign_quotation");
            return Err(ApplicationError::InvalidInput(format!(
                "Quotation {} does not belong to indent {}",
                quotation.id, indent.id
            )));
        }

        let confirmation = ApprovalConfirmation {
            indent_id: indent.id,
            quotation_id: quotation.id,
            vendor_name: quotation.vendor_name.clone(),
            item_name: indent.item_name.clone(),
            already_approved: false,
        };

        if indent.status == IndentStatus::Approved {
            if quotation.is_approved {
                info!(
                    event_name = "procurement.approval.repeated",
                    correlation_id = %correlation_id,
                    indent_id = %indent.id,
                    quotation_id = %quotation.id,
                    "indent already approved with this quotation"
                );
                return Ok(ApprovalConfirmation { already_approved: true, ..confirmation });
            }

            self.reject_approval(&indent, &quotation, correlation_id, "already_approved");
            return Err(ApplicationError::Conflict(format!(
                "Indent {} already has an approved quotation",
                indent.id
            )));
        }

        let mut next = indent.clone();
        next.transition_to(IndentStatus::Approved)?;
        self.store.commit_approval(indent.id, quotation.id, indent.status).await?;

        info!(
            event_name = "procurement.approval.committed",
            correlation_id = %correlation_id,
            indent_id = %indent.id,
            quotation_id = %quotation.id,
            vendor_name = %quotation.vendor_name,
            "quotation approved for indent"
        );
        self.audit.emit(
            AuditEvent::new(
                Some(indent.id),
                correlation_id,
                "procurement.approval.committed",
                AuditCategory::Approval,
                quotation.vendor_name.clone(),
                AuditOutcome::Success,
            )
            .with_metadata("quotation_id", quotation.id.to_string())
            .with_metadata("price", quotation.price.to_string()),
        );

        Ok(confirmation)
    }

    fn reject_approval(
        &self,
        indent: &MaterialIndent,
        quotation: &MaterialQuotation,
        correlation_id: &str,
        reason: &str,
    ) {
        warn!(
            event_name = "procurement.approval.rejected",
            correlation_id = %correlation_id,
            indent_id = %indent.id,
            quotation_id = %quotation.id,
            reason = reason,
            "approval refused"
        );
        self.audit.emit(
            AuditEvent::new(
                Some(indent.id),
                correlation_id,
                "procurement.approval.rejected",
                AuditCategory::Approval,
                quotation.vendor_name.clone(),
                AuditOutcome::Rejected,
            )
            .with_metadata("quotation_id", quotation.id.to_string())
            .with_metadata("reason", reason),
        );
    }
}

fn require_text(field: &str, value: &str) -> Result<(), ApplicationError> {
    if value.trim().is_empty() {
        return Err(ApplicationError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}
