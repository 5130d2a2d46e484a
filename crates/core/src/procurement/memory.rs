use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::indent::{IndentId, IndentStatus, MaterialIndent, NewIndent};
use crate::domain::project::ProjectId;
use crate::domain::quotation::{MaterialQuotation, NewQuotation, QuotationId};
use crate::errors::ApplicationError;
use crate::procurement::store::{already_approved, stale_indent, ProcurementStore};

#[derive(Default)]
struct Ledger {
    indents: Vec<MaterialIndent>,
    quotations: Vec<MaterialQuotation>,
}

impl Ledger {
    fn indent_mut(&mut self, id: IndentId) -> Option<&mut MaterialIndent> {
        self.indents.iter_mut().find(|indent| indent.id == id)
    }
}

/// Process-local store. One lock guards both tables, so multi-row writes are
/// all-or-nothing.
#[derive(Default)]
pub struct InMemoryProcurementStore {
    ledger: Mutex<Ledger>,
}

impl InMemoryProcurementStore {
    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        match self.ledger.lock() {
            Ok(ledger) => ledger,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl ProcurementStore for InMemoryProcurementStore {
    async fn insert_indent(&self, indent: NewIndent) -> Result<MaterialIndent, ApplicationError> {
        let mut ledger = self.ledger();
        let id = IndentId(ledger.indents.len() as i64 + 1);
        let stored = indent.into_indent(id);
        ledger.indents.push(stored.clone());
        Ok(stored)
    }

    async fn find_indent(&self, id: IndentId) -> Result<Option<MaterialIndent>, ApplicationError> {
        Ok(self.ledger().indents.iter().find(|indent| indent.id == id).cloned())
    }

    async fn list_indents(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<MaterialIndent>, ApplicationError> {
        Ok(self
            .ledger()
            .indents
            .iter()
            .filter(|indent| indent.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn insert_quotation(
        &self,
        quotation: NewQuotation,
    ) -> Result<MaterialQuotation, ApplicationError> {
        let mut ledger = self.ledger();
        let id = QuotationId(ledger.quotations.len() as i64 + 1);
        let indent_id = quotation.indent_id;

        let indent = ledger
            .indent_mut(indent_id)
            .ok_or_else(|| ApplicationError::NotFound("Indent ID not found".to_string()))?;
        if indent.status == IndentStatus::Approved {
            return Err(already_approved(indent_id));
        }
        indent.status = IndentStatus::Quoted;

        let stored = quotation.into_quotation(id);
        ledger.quotations.push(stored.clone());
        Ok(stored)
    }

    async fn find_quotation(
        &self,
        id: QuotationId,
    ) -> Result<Option<MaterialQuotation>, ApplicationError> {
        Ok(self.ledger().quotations.iter().find(|quotation| quotation.id == id).cloned())
    }

    async fn list_quotations(
        &self,
        indent_id: IndentId,
    ) -> Result<Vec<MaterialQuotation>, ApplicationError> {
        Ok(self
            .ledger()
            .quotations
            .iter()
            .filter(|quotation| quotation.indent_id == indent_id)
            .cloned()
            .collect())
    }

    async fn commit_approval(
        &self,
        indent_id: IndentId,
        quotation_id: QuotationId,
        expected: IndentStatus,
    ) -> Result<(), ApplicationError> {
        let mut ledger = self.ledger();

        let quotation_index = ledger
            .quotations
            .iter()
            .position(|quotation| quotation.id == quotation_id)
            .ok_or_else(|| ApplicationError::NotFound("Quotation not found".to_string()))?;

        let indent = ledger
            .indent_mut(indent_id)
            .ok_or_else(|| ApplicationError::NotFound("Indent not found".to_string()))?;
        if indent.status != expected {
            return Err(stale_indent(indent_id, expected));
        }
        indent.status = IndentStatus::Approved;
        ledger.quotations[quotation_index].is_approved = true;
        Ok(())
    }
}
