//! Preview sessions: values typed into the live form, the submit gate, and
//! the submission summary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, ValidationErrors};
use crate::store::FieldCollection;
use crate::validation::validate_form;

/// A value entered for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    /// Explicitly empty.
    Null,
    /// Checkbox state.
    Bool(bool),
    /// Numeric input.
    Number(f64),
    /// Text-like input, or a single select choice.
    Text(String),
    /// Multi-select choices.
    List(Vec<String>),
}

impl FormValue {
    /// Returns whether the value counts as present.
    ///
    /// `Null`, `false`, `0` and the empty string do not; lists always do,
    /// even when empty.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => n.abs() > 0.0,
            Self::Text(s) => !s.is_empty(),
            Self::List(_) => true,
        }
    }

    /// Returns the plain string form of the value.
    ///
    /// Lists are joined with `,`.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(","),
        }
    }

    /// Returns the value as shown in a submission summary.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Null => MISSING.to_string(),
            Self::Bool(true) => "Yes".to_string(),
            Self::Bool(false) => "No".to_string(),
            Self::List(items) => items.join(", "),
            other => other.as_text(),
        }
    }
}

impl From<&FormValue> for Value {
    fn from(value: &FormValue) -> Self {
        match value {
            FormValue::Null => Self::Null,
            FormValue::Bool(b) => Self::Bool(*b),
            FormValue::Number(n) => Self::from(*n),
            FormValue::Text(s) => Self::String(s.clone()),
            FormValue::List(items) => {
                Self::Array(items.iter().cloned().map(Self::String).collect())
            }
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Values keyed by field name.
pub type FormValues = BTreeMap<String, FormValue>;

const MISSING: &str = "—";

/// One line of a submission summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRow {
    /// Field label.
    pub label: String,
    /// Field name.
    pub name: String,
    /// Display form of the submitted value.
    pub value: String,
}

/// The result of a successful submit.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// One row per field, in field order.
    pub rows: Vec<SubmissionRow>,
    /// Every field name mapped to its value, or `null`.
    pub values: Map<String, Value>,
}

impl Submission {
    /// Builds the summary of `values` for `fields`.
    #[must_use]
    pub fn new(fields: &FieldCollection, values: &FormValues) -> Self {
        let mut rows = Vec::with_capacity(fields.len());
        let mut out = Map::new();
        for field in fields {
            let value = values.get(&field.name);
            rows.push(SubmissionRow {
                label: field.label.clone(),
                name: field.name.clone(),
                value: value.map_or_else(|| MISSING.to_string(), FormValue::display),
            });
            out.insert(field.name.clone(), value.map_or(Value::Null, Value::from));
        }
        Self { rows, values: out }
    }

    /// Serializes the submitted values as indented JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.values)?)
    }
}

/// Values entered into the live preview, plus whether a submit was tried.
///
/// Errors are always computable; they become visible only after the first
/// submit attempt.
#[derive(Debug, Clone, Default)]
pub struct PreviewSession {
    values: FormValues,
    submitted: bool,
}

impl PreviewSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session pre-filled with values.
    #[must_use]
    pub fn with_values(values: FormValues) -> Self {
        Self {
            values,
            submitted: false,
        }
    }

    /// Sets the value of one field.
    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the value of one field.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&FormValue> {
        self.values.get(name)
    }

    /// Returns all entered values.
    #[must_use]
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Returns whether a submit was attempted since the last reset.
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Clears all values and the submitted flag.
    pub fn reset(&mut self) {
        self.values.clear();
        self.submitted = false;
    }

    /// Validates the current values.
    #[must_use]
    pub fn errors(&self, fields: &FieldCollection) -> ValidationErrors {
        validate_form(fields, &self.values)
    }

    /// Returns the errors to display: none until the first submit attempt.
    #[must_use]
    pub fn visible_errors(&self, fields: &FieldCollection) -> ValidationErrors {
        if self.submitted {
            self.errors(fields)
        } else {
            ValidationErrors::new()
        }
    }

    /// Attempts a submit.
    ///
    /// Marks the session as submitted. Returns the submission summary if the
    /// values pass validation, or the errors otherwise.
    pub fn submit(
        &mut self,
        fields: &FieldCollection,
    ) -> std::result::Result<Submission, ValidationErrors> {
        self.submitted = true;
        let errors = self.errors(fields);
        if errors.is_empty() {
            Ok(Submission::new(fields, &self.values))
        } else {
            Err(errors)
        }
    }
}
