//! Error types for the overseer subsystem.
//!
//! This module provides the [`OverseerError`] enum covering validation,
//! storage, and query failures, plus the structured [`StoreError`] that
//! storage backends report. Backends classify their own failures into
//! [`StoreErrorKind`] codes so no caller ever has to pattern-match
//! human-readable error text.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Represents a validation failure on a record or parameter.
///
/// Carries a message, a short machine-readable code, and optional
/// parameters providing context (e.g. the offending value).
///
/// # Examples
///
/// ```
/// use overseer_core::error::ValidationError;
///
/// let err = ValidationError::new("month must be between 1 and 12", "month_range")
///     .with_param("month", "13");
/// assert_eq!(err.code, "month_range");
/// ```
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The primary error message.
    pub message: String,
    /// A short code identifying the type of validation failure (e.g. "required", "month_range").
    pub code: String,
    /// Additional parameters providing context for the error message.
    pub params: HashMap<String, String>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Structured failure codes reported by storage backends.
///
/// A backend maps its driver-level errors onto these codes once, at the
/// storage boundary. `SchemaMissing` is the code for "the expected table or
/// column does not exist", which the summary layer surfaces with a setup
/// hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StoreErrorKind {
    /// The expected table or column does not exist in the backing store.
    SchemaMissing,
    /// The store could not be reached or the operation timed out.
    Unavailable,
    /// A constraint on the stored data was violated.
    Constraint,
    /// Any other backend failure.
    Other,
}

impl StoreErrorKind {
    /// Returns a short label for this kind.
    pub const fn label(self) -> &'static str {
        match self {
            Self::SchemaMissing => "schema missing",
            Self::Unavailable => "unavailable",
            Self::Constraint => "constraint violated",
            Self::Other => "storage failure",
        }
    }
}

/// An error reported by a storage backend.
///
/// The `kind` is the structured classification; `message` preserves the
/// backend's original detail text for logs and diagnostics.
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", .kind.label())]
pub struct StoreError {
    /// The structured failure classification.
    pub kind: StoreErrorKind,
    /// The backend's original error detail.
    pub message: String,
}

impl StoreError {
    /// Creates a new `StoreError`.
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a `SchemaMissing` error.
    pub fn schema_missing(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::SchemaMissing, message)
    }
}

/// The primary error type for the overseer subsystem.
///
/// Covers record validation, storage failures, aggregate-query failures,
/// and adapter lookups. The summary layer re-raises aggregate-query
/// failures under `Query`, or under `SchemaMissing` with a remediation
/// hint when the store reported a missing table.
#[derive(Error, Debug)]
pub enum OverseerError {
    /// A record or parameter failed validation.
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    /// A storage backend operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An aggregate-count query failed; the original message is preserved.
    #[error("Query error: {0}")]
    Query(String),

    /// The history table is not installed. `detail` preserves the store's
    /// original message; `hint` tells the operator how to fix it.
    #[error("{hint} ({detail})")]
    SchemaMissing {
        /// Human-readable remediation step.
        hint: String,
        /// The store's original error detail.
        detail: String,
    },

    /// A named model was not found in the registry.
    #[error("Unknown model: {0}")]
    NotFound(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<ValidationError> for OverseerError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// A convenience type alias for `Result<T, OverseerError>`.
pub type OverseerResult<T> = Result<T, OverseerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("table is required", "required");
        assert_eq!(err.to_string(), "table is required");
    }

    #[test]
    fn test_validation_error_with_param() {
        let err = ValidationError::new("year out of range", "year_range").with_param("year", "2042");
        assert_eq!(err.params.get("year").unwrap(), "2042");
    }

    #[test]
    fn test_store_error_display_includes_kind_and_detail() {
        let err = StoreError::schema_missing("no such table: overseer_histories");
        assert_eq!(err.kind, StoreErrorKind::SchemaMissing);
        assert_eq!(
            err.to_string(),
            "schema missing: no such table: overseer_histories"
        );
    }

    #[test]
    fn test_store_error_kind_labels() {
        assert_eq!(StoreErrorKind::SchemaMissing.label(), "schema missing");
        assert_eq!(StoreErrorKind::Unavailable.label(), "unavailable");
        assert_eq!(StoreErrorKind::Constraint.label(), "constraint violated");
        assert_eq!(StoreErrorKind::Other.label(), "storage failure");
    }

    #[test]
    fn test_overseer_error_from_store_error() {
        let err: OverseerError = StoreError::new(StoreErrorKind::Unavailable, "timeout").into();
        assert!(matches!(err, OverseerError::Store(_)));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_overseer_error_from_validation_error() {
        let err: OverseerError = ValidationError::new("month must be between 1 and 12", "month_range").into();
        assert!(matches!(err, OverseerError::Validation(_)));
    }

    #[test]
    fn test_schema_missing_display_keeps_detail() {
        let err = OverseerError::SchemaMissing {
            hint: "Run the overseer install migration, then retry".to_string(),
            detail: "no such table: overseer_histories".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("install migration"));
        assert!(text.contains("no such table: overseer_histories"));
    }

    #[test]
    fn test_query_error_preserves_message() {
        let err = OverseerError::Query("aggregate failed: disk I/O error".to_string());
        assert_eq!(err.to_string(), "Query error: aggregate failed: disk I/O error");
    }
}
