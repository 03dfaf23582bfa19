//! JSON request intake.
//!
//! Accepts the same document shape an HTTP front end would receive and
//! returns a validated [`Invoice`]. Numeric fields may be JSON numbers or
//! strings; numbers are converted through their decimal text form, never
//! through a binary float multiply.

use super::error::FacturxError;
use super::types::Invoice;
use super::validation::validate_invoice;

impl Invoice {
    /// Deserialize and validate an invoice from JSON.
    pub fn from_json(json: &str) -> Result<Self, FacturxError> {
        let invoice: Invoice =
            serde_json::from_str(json).map_err(|e| FacturxError::Json(e.to_string()))?;

        let errors = validate_invoice(&invoice);
        if !errors.is_empty() {
            tracing::debug!(
                invoice = %invoice.invoice_number,
                errors = errors.len(),
                "rejected invoice on intake"
            );
            return Err(FacturxError::Validation(errors));
        }

        Ok(invoice)
    }

    /// Serialize to the JSON intake shape.
    pub fn to_json(&self) -> Result<String, FacturxError> {
        serde_json::to_string_pretty(self).map_err(|e| FacturxError::Json(e.to_string()))
    }
}
