use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::indent::IndentId;
use crate::errors::ApplicationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuotationId(pub i64);

impl std::fmt::Display for QuotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialQuotation {
    pub id: QuotationId,
    pub indent_id: IndentId,
    pub vendor_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub is_approved: bool,
}

impl MaterialQuotation {
    pub fn belongs_to(&self, indent_id: IndentId) -> bool {
        self.indent_id == indent_id
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewQuotation {
    pub indent_id: IndentId,
    pub vendor_name: String,
    pub price: Decimal,
}

impl NewQuotation {
    /// Rejects negative prices. A zero price is accepted (free issue material).
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.price < Decimal::ZERO {
            return Err(ApplicationError::InvalidInput(format!(
                "price must not be negative (got {})",
                self.price
            )));
        }
        Ok(())
    }

    pub fn into_quotation(self, id: QuotationId) -> MaterialQuotation {
        MaterialQuotation {
            id,
            indent_id: self.indent_id,
            vendor_name: self.vendor_name,
            price: self.price,
            is_approved: false,
        }
    }
}
