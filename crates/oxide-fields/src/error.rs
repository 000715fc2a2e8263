//! Error types for the field schema engine.

use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by the field schema engine.
///
/// Store transitions never produce errors; malformed transition payloads
/// resolve to a no-op instead. Only schema import and the raw snapshot
/// backends report failures.
#[derive(Debug, Error)]
pub enum FieldsError {
    /// Imported JSON was unparsable or had an unrecognized shape.
    #[error("invalid schema: {0}")]
    MalformedImport(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error while reading or writing a snapshot.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FieldsError {
    /// Creates a `MalformedImport` error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedImport(reason.into())
    }
}

/// Validation errors keyed by field name.
///
/// Each field carries at most one message. Adding a second message for the
/// same name replaces the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Errors keyed by field name.
    pub errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    /// Creates a new empty `ValidationErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }

    /// Sets the error for a field, replacing any previous one.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field.to_string(), message.into());
    }

    /// Returns whether there are any errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns the error for a specific field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Returns all errors as `(field, message)` pairs, ordered by field name.
    #[must_use]
    pub fn all_errors(&self) -> Vec<(&str, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
            .collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (field, message) in &self.errors {
            writeln!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Result type alias for field engine operations.
pub type Result<T> = std::result::Result<T, FieldsError>;
