pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod procurement;

pub use audit::{AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use domain::indent::{IndentId, IndentStatus, MaterialIndent, Priority};
pub use domain::project::{Project, ProjectId};
pub use domain::quotation::{MaterialQuotation, QuotationId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use procurement::{
    ApprovalConfirmation, ApproveQuotation, InMemoryProcurementStore, ProcurementService,
    ProcurementStore, RaiseIndent, SubmitQuotation,
};
