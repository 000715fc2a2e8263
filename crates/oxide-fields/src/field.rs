//! Field definitions and the field factory.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::defaults::{DEFAULT_DATE_FORMAT, DEFAULT_DATE_TIME_FORMAT, DEFAULT_OPTIONS};
use crate::id::{FieldId, IdentityAllocator};

/// The kind of form control a field renders as.
///
/// Serialized as a lowercase string. `dateTime` is accepted as an alias for
/// `datetime`; any other unrecognized string is kept as [`FieldType::Other`]
/// and behaves like `text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Single-line text input.
    #[default]
    Text,
    /// Numeric input.
    Number,
    /// Email input.
    Email,
    /// Password input.
    Password,
    /// Multi-line text input.
    Textarea,
    /// Dropdown over the field's options.
    Select,
    /// Boolean checkbox.
    Checkbox,
    /// Date picker.
    Date,
    /// Date and time picker.
    DateTime,
    /// A type name this engine does not know.
    Other(String),
}

impl FieldType {
    /// All built-in types, in builder menu order.
    pub const BUILTIN: [Self; 9] = [
        Self::Text,
        Self::Number,
        Self::Email,
        Self::Password,
        Self::Textarea,
        Self::Select,
        Self::Checkbox,
        Self::Date,
        Self::DateTime,
    ];

    /// Returns the wire name of this type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Email => "email",
            Self::Password => "password",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text" => Self::Text,
            "number" => Self::Number,
            "email" => Self::Email,
            "password" => Self::Password,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "checkbox" => Self::Checkbox,
            "date" => Self::Date,
            "datetime" | "dateTime" => Self::DateTime,
            _ => Self::Other(value),
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        match value {
            FieldType::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl FromStr for FieldType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Choices offered by a `select` field.
///
/// Kept in whichever shape it arrived in: a comma-separated string (what
/// the builder edits) or an array of strings (what some imported schemas
/// carry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionList {
    /// Comma-separated options, e.g. `"Engineer, Designer"`.
    Text(String),
    /// One entry per option.
    List(Vec<String>),
}

impl OptionList {
    /// Returns the individual options, trimmed, with empty entries dropped.
    #[must_use]
    pub fn values(&self) -> Vec<String> {
        let trimmed = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        match self {
            Self::Text(text) => text.split(',').filter_map(trimmed).collect(),
            Self::List(items) => items.iter().filter_map(|s| trimmed(s)).collect(),
        }
    }
}

impl Default for OptionList {
    fn default() -> Self {
        Self::Text(DEFAULT_OPTIONS.to_string())
    }
}

impl From<&str> for OptionList {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

const fn default_true() -> bool {
    true
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_date_time_format() -> String {
    DEFAULT_DATE_TIME_FORMAT.to_string()
}

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

/// Turns typed text into a submission key: every whitespace run becomes `_`.
///
/// Leading and trailing runs are replaced too, so `" a b "` becomes `"_a_b_"`.
#[must_use]
pub fn submission_key(input: &str) -> String {
    WHITESPACE_RUN.replace_all(input, "_").into_owned()
}

/// One configurable form control.
///
/// Serialized with the camelCase keys of the schema format. Keys this type
/// does not model are kept in [`extra`](Self::extra) and written back out
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Unique identifier, fixed at creation.
    pub id: FieldId,
    /// Submission key.
    pub name: String,
    /// Display text.
    pub label: String,
    /// Control type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether a value must be provided.
    #[serde(default)]
    pub required: bool,
    /// Whether the control spans the full row.
    #[serde(default = "default_true")]
    pub full_width: bool,
    /// Placeholder text.
    #[serde(default)]
    pub placeholder: String,
    /// Helper text shown below the control.
    #[serde(default)]
    pub helper_text: String,
    /// Options, used by `select` only.
    #[serde(default)]
    pub options: OptionList,
    /// Multi-select, used by `select` only.
    #[serde(default)]
    pub multiple: bool,
    /// Display format for `date` fields.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Display format for `datetime` fields.
    #[serde(default = "default_date_time_format")]
    pub date_time_format: String,
    /// Earliest selectable date (`YYYY-MM-DD`), or empty.
    #[serde(default)]
    pub min_date: String,
    /// Latest selectable date (`YYYY-MM-DD`), or empty.
    #[serde(default)]
    pub max_date: String,
    /// Earliest selectable date and time (`YYYY-MM-DDTHH:mm`), or empty.
    #[serde(default)]
    pub min_date_time: String,
    /// Latest selectable date and time (`YYYY-MM-DDTHH:mm`), or empty.
    #[serde(default)]
    pub max_date_time: String,
    /// Unrecognized keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldDefinition {
    /// Creates a base field with a freshly allocated id.
    pub fn new(ids: &dyn IdentityAllocator) -> Self {
        Self::with_id(ids.allocate())
    }

    /// Creates a base field with the given id.
    ///
    /// The submission key is `field_` followed by a short key derived from
    /// the id.
    #[must_use]
    pub fn with_id(id: FieldId) -> Self {
        let name = format!("field_{}", id.short_key());
        Self {
            id,
            name,
            label: "Untitled".to_string(),
            field_type: FieldType::Text,
            required: false,
            full_width: true,
            placeholder: String::new(),
            helper_text: String::new(),
            options: OptionList::default(),
            multiple: false,
            date_format: default_date_format(),
            date_time_format: default_date_time_format(),
            min_date: String::new(),
            max_date: String::new(),
            min_date_time: String::new(),
            max_date_time: String::new(),
            extra: Map::new(),
        }
    }

    /// Sets the submission key.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the field type without applying type defaults.
    #[must_use]
    pub fn of_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Makes the field required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = text.into();
        self
    }

    /// Sets the helper text.
    #[must_use]
    pub fn helper_text(mut self, text: impl Into<String>) -> Self {
        self.helper_text = text.into();
        self
    }

    /// Sets the options.
    #[must_use]
    pub fn options(mut self, options: impl Into<OptionList>) -> Self {
        self.options = options.into();
        self
    }

    /// Enables multi-select.
    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Returns whether this is a checkbox.
    #[must_use]
    pub fn is_checkbox(&self) -> bool {
        self.field_type == FieldType::Checkbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialAllocator;
    use serde_json::json;

    #[test]
    fn test_factory_defaults() {
        let ids = SequentialAllocator::new();
        let field = FieldDefinition::new(&ids);

        assert_eq!(field.id.as_str(), "field-1");
        assert_eq!(field.name, "field_ield1");
        assert_eq!(field.label, "Untitled");
        assert_eq!(field.field_type, FieldType::Text);
        assert!(!field.required);
        assert!(field.full_width);
        assert_eq!(field.options.values(), vec!["Option A", "Option B"]);
        assert_eq!(field.date_format, "DD/MM/YYYY");
        assert_eq!(field.date_time_format, "DD/MM/YYYY HH:mm");
        assert_eq!(field.min_date_time, "");
    }

    #[test]
    fn test_field_type_wire_names() {
        for ty in FieldType::BUILTIN {
            let back = FieldType::from(ty.as_str().to_string());
            assert_eq!(back, ty);
        }
        assert_eq!(FieldType::from("dateTime".to_string()), FieldType::DateTime);
        assert_eq!(
            FieldType::from("color".to_string()),
            FieldType::Other("color".to_string())
        );
        assert_eq!(
            serde_json::to_value(FieldType::DateTime).unwrap(),
            json!("datetime")
        );
    }

    #[test]
    fn test_option_list_values() {
        let text = OptionList::from(" Engineer, Designer ,, Product ");
        assert_eq!(text.values(), vec!["Engineer", "Designer", "Product"]);

        let list = OptionList::List(vec!["A".into(), " ".into(), "B ".into()]);
        assert_eq!(list.values(), vec!["A", "B"]);
    }

    #[test]
    fn test_serializes_camel_case_and_extras() {
        let ids = SequentialAllocator::new();
        let mut field = FieldDefinition::new(&ids)
            .name("email")
            .label("Email")
            .of_type(FieldType::Email)
            .required()
            .helper_text("We never share it");
        field.extra.insert("icon".into(), json!("mail"));

        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], json!("email"));
        assert_eq!(value["helperText"], json!("We never share it"));
        assert_eq!(value["fullWidth"], json!(true));
        assert_eq!(value["dateTimeFormat"], json!("DD/MM/YYYY HH:mm"));
        assert_eq!(value["icon"], json!("mail"));

        let back: FieldDefinition = serde_json::from_value(value).unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn test_options_keep_array_shape() {
        let value = json!({
            "id": "a", "name": "role", "label": "Role", "type": "select",
            "options": ["One", "Two"]
        });
        let field: FieldDefinition = serde_json::from_value(value).unwrap();
        assert_eq!(
            field.options,
            OptionList::List(vec!["One".into(), "Two".into()])
        );
        assert_eq!(serde_json::to_value(&field).unwrap()["options"], json!(["One", "Two"]));
    }

    #[test]
    fn test_missing_extras_deserialize_to_defaults() {
        let value = json!({"id": "a", "name": "d", "label": "D", "type": "date", "dateFormat": "YYYY"});
        let field: FieldDefinition = serde_json::from_value(value).unwrap();
        assert_eq!(field.date_format, "YYYY");
        assert_eq!(field.date_time_format, "DD/MM/YYYY HH:mm");
        assert_eq!(field.min_date, "");

        let out = serde_json::to_value(&field).unwrap();
        assert_eq!(out["maxDateTime"], json!(""));
        assert_eq!(out["dateTimeFormat"], json!("DD/MM/YYYY HH:mm"));
    }

    #[test]
    fn test_submission_key() {
        assert_eq!(submission_key(" a b "), "_a_b_");
        assert_eq!(submission_key("first \t name"), "first_name");
        assert_eq!(submission_key("plain"), "plain");
    }
}
