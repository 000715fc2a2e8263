//! Form value validators.
//!
//! Validation is deliberately small: required fields must have a value, and
//! email fields with a value must look like an email address. Nothing else
//! (numeric ranges, date bounds) is checked here.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationErrors;
use crate::field::{FieldDefinition, FieldType};
use crate::preview::{FormValue, FormValues};
use crate::store::FieldCollection;

/// local-part, `@`, domain containing a dot
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^@\s]+@[^@\s]+\.[^@\s]+").expect("email pattern compiles"));

/// Trait for field validators.
pub trait Validator: Send + Sync {
    /// Validates a submitted value and returns an error message if invalid.
    ///
    /// `None` means no value was submitted for the field.
    fn validate(&self, value: Option<&FormValue>) -> Result<(), String>;

    /// Returns the error message for this validator.
    fn message(&self) -> &str;
}

/// Validator that requires a value.
///
/// In text mode the value's string form must be non-blank after trimming.
/// In checked mode (checkboxes) the value must be truthy.
#[derive(Debug, Clone)]
pub struct RequiredValidator {
    message: String,
    checked: bool,
}

impl RequiredValidator {
    /// Creates a RequiredValidator for text-like values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            message: "Required".to_string(),
            checked: false,
        }
    }

    /// Creates a RequiredValidator for checkboxes.
    #[must_use]
    pub fn checked() -> Self {
        Self {
            checked: true,
            ..Self::new()
        }
    }

    /// Replaces the error message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Default for RequiredValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for RequiredValidator {
    fn validate(&self, value: Option<&FormValue>) -> Result<(), String> {
        let ok = match value {
            None => false,
            Some(v) if self.checked => v.is_truthy(),
            Some(v) => v.is_truthy() && !v.as_text().trim().is_empty(),
        };
        if ok {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator for email addresses. Empty values pass.
#[derive(Debug, Clone)]
pub struct EmailValidator {
    message: String,
}

impl EmailValidator {
    /// Creates a new EmailValidator with default message.
    #[must_use]
    pub fn new() -> Self {
        Self {
            message: "Invalid email".to_string(),
        }
    }

    /// Creates a new EmailValidator with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for EmailValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for EmailValidator {
    fn validate(&self, value: Option<&FormValue>) -> Result<(), String> {
        match value {
            Some(v) if v.is_truthy() && !EMAIL_SHAPE.is_match(&v.as_text()) => {
                Err(self.message.clone())
            }
            _ => Ok(()),
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Returns the validators that apply to a field, in evaluation order.
#[must_use]
pub fn validators_for(field: &FieldDefinition) -> Vec<Box<dyn Validator>> {
    let mut validators: Vec<Box<dyn Validator>> = Vec::new();
    if field.required {
        if field.is_checkbox() {
            validators.push(Box::new(RequiredValidator::checked()));
        } else {
            validators.push(Box::new(RequiredValidator::new()));
        }
    }
    if field.field_type == FieldType::Email {
        validators.push(Box::new(EmailValidator::new()));
    }
    validators
}

/// Validates submitted values against every field of a collection.
///
/// A later failing validator replaces an earlier message for the same
/// field name.
#[must_use]
pub fn validate_form(fields: &FieldCollection, values: &FormValues) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for field in fields {
        let value = values.get(&field.name);
        for validator in validators_for(field) {
            if let Err(msg) = validator.validate(value) {
                errors.add(&field.name, msg);
            }
        }
    }
    errors
}
