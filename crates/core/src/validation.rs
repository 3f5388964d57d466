//! Field-level validation errors shared by every input payload.

use serde::Serialize;

/// A single invalid field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as it appears in the JSON payload.
    pub field: &'static str,
    /// Human-readable reason (pt-BR, shown to the customer).
    pub message: String,
}

/// All the problems found in one payload, reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}", summary(.0))]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Create an empty collector.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record an invalid field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record `field` as missing if `value` is blank.
    pub fn require(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "campo obrigatório");
        }
    }

    /// Whether no error was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The recorded errors.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether `field` has at least one error.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_flags_blank_fields() {
        let mut errors = ValidationErrors::new();
        errors.require("nome", "  ");
        errors.require("email", "ana@exemplo.com");
        assert!(errors.has("nome"));
        assert!(!errors.has("email"));
        assert_eq!(errors.to_string(), "nome: campo obrigatório");
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ValidationErrors::new().into_result(3), Ok(3));
        let mut errors = ValidationErrors::new();
        errors.add("quantidade", "deve ser maior que zero");
        assert!(errors.into_result(()).is_err());
    }
}
