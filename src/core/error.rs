use thiserror::Error;

/// Errors that can occur during invoice intake or XML generation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FacturxError {
    /// One or more data-model invariants failed on intake.
    #[error("validation failed: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// XML serialization error.
    #[error("XML error: {0}")]
    Xml(String),

    /// The generated XML was rejected by a schema validator.
    ///
    /// Unlike [`FacturxError::Validation`], this points at the XML generator
    /// itself, not at the caller's input.
    #[error("schema validation failed: {}", join_messages(.0))]
    Schema(Vec<SchemaViolation>),

    /// The intake document is not valid JSON or has the wrong shape.
    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(String),
}

impl FacturxError {
    /// Validation errors carried by this error, if it is a [`FacturxError::Validation`].
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_messages<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "seller.address.country_code").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// EN 16931 business rule ID if applicable (e.g. "BR-16").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with an EN 16931 rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}

/// A schema violation reported against generated XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Slash-separated element path where the violation was found, if known.
    pub path: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl SchemaViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: None,
            message: message.into(),
        }
    }

    pub fn at(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display_includes_rule() {
        let err = ValidationError::with_rule("line_items", "at least one line is required", "BR-16");
        assert_eq!(err.to_string(), "[BR-16] line_items: at least one line is required");
        let err = ValidationError::new("line_items[0].quantity", "must be positive");
        assert_eq!(err.to_string(), "line_items[0].quantity: must be positive");
    }

    #[test]
    fn error_joins_all_messages() {
        let err = FacturxError::Validation(vec![
            ValidationError::new("a", "first"),
            ValidationError::new("b", "second"),
        ]);
        assert_eq!(err.to_string(), "validation failed: a: first; b: second");
        assert_eq!(err.validation_errors().len(), 2);

        let err = FacturxError::Schema(vec![SchemaViolation::at(
            "rsm:CrossIndustryInvoice",
            "missing namespace",
        )]);
        assert!(err.validation_errors().is_empty());
        assert_eq!(
            err.to_string(),
            "schema validation failed: rsm:CrossIndustryInvoice: missing namespace"
        );
    }
}
