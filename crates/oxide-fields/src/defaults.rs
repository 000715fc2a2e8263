//! Per-type default attributes and the type-change protocol.
//!
//! Each field type may carry extra attributes (date formats, date bounds,
//! ...). The table here lists, per type, which extras the type uses and what
//! they default to. Changing a field's type fills any empty extra of the
//! target type from the table, keeps values already set, and then clears the
//! bounds that belong to the other temporal type.

use crate::field::{FieldDefinition, FieldType};
use crate::id::IdentityAllocator;

/// Default display format of `date` fields.
pub const DEFAULT_DATE_FORMAT: &str = "DD/MM/YYYY";

/// Default display format of `datetime` fields.
pub const DEFAULT_DATE_TIME_FORMAT: &str = "DD/MM/YYYY HH:mm";

/// Default options of a freshly created field.
pub const DEFAULT_OPTIONS: &str = "Option A, Option B";

/// An attribute governed by the type defaults table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeAttr {
    /// `placeholder`
    Placeholder,
    /// `helperText`
    HelperText,
    /// `dateFormat`
    DateFormat,
    /// `dateTimeFormat`
    DateTimeFormat,
    /// `minDate`
    MinDate,
    /// `maxDate`
    MaxDate,
    /// `minDateTime`
    MinDateTime,
    /// `maxDateTime`
    MaxDateTime,
}

impl TypeAttr {
    /// Returns the schema key of this attribute.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Placeholder => "placeholder",
            Self::HelperText => "helperText",
            Self::DateFormat => "dateFormat",
            Self::DateTimeFormat => "dateTimeFormat",
            Self::MinDate => "minDate",
            Self::MaxDate => "maxDate",
            Self::MinDateTime => "minDateTime",
            Self::MaxDateTime => "maxDateTime",
        }
    }
}

const CHOICE_DEFAULTS: &[(TypeAttr, &str)] =
    &[(TypeAttr::Placeholder, ""), (TypeAttr::HelperText, "")];

const DATE_DEFAULTS: &[(TypeAttr, &str)] = &[
    (TypeAttr::Placeholder, ""),
    (TypeAttr::HelperText, ""),
    (TypeAttr::DateFormat, DEFAULT_DATE_FORMAT),
    (TypeAttr::MinDate, ""),
    (TypeAttr::MaxDate, ""),
    (TypeAttr::MinDateTime, ""),
    (TypeAttr::MaxDateTime, ""),
];

const DATE_TIME_DEFAULTS: &[(TypeAttr, &str)] = &[
    (TypeAttr::Placeholder, ""),
    (TypeAttr::HelperText, ""),
    (TypeAttr::DateTimeFormat, DEFAULT_DATE_TIME_FORMAT),
    (TypeAttr::MinDateTime, ""),
    (TypeAttr::MaxDateTime, ""),
    (TypeAttr::MinDate, ""),
    (TypeAttr::MaxDate, ""),
];

/// Returns the defaulted extras of a field type.
///
/// Types without extras return an empty table.
#[must_use]
pub fn type_defaults(field_type: &FieldType) -> &'static [(TypeAttr, &'static str)] {
    match field_type {
        FieldType::Checkbox | FieldType::Select => CHOICE_DEFAULTS,
        FieldType::Date => DATE_DEFAULTS,
        FieldType::DateTime => DATE_TIME_DEFAULTS,
        _ => &[],
    }
}

/// Fills `attr` with `default` when the field holds an empty value for it.
fn fill(field: &mut FieldDefinition, attr: TypeAttr, default: &str) {
    let slot = match attr {
        TypeAttr::Placeholder => &mut field.placeholder,
        TypeAttr::HelperText => &mut field.helper_text,
        TypeAttr::DateFormat => &mut field.date_format,
        TypeAttr::DateTimeFormat => &mut field.date_time_format,
        TypeAttr::MinDate => &mut field.min_date,
        TypeAttr::MaxDate => &mut field.max_date,
        TypeAttr::MinDateTime => &mut field.min_date_time,
        TypeAttr::MaxDateTime => &mut field.max_date_time,
    };
    if slot.is_empty() {
        default.clone_into(slot);
    }
}

/// Computes the record a field becomes when switched to `next`.
#[must_use]
pub fn apply_type_defaults(field: &FieldDefinition, next: FieldType) -> FieldDefinition {
    let mut out = field.clone();
    for (attr, default) in type_defaults(&next) {
        fill(&mut out, *attr, default);
    }

    match next {
        FieldType::Date => {
            out.min_date_time.clear();
            out.max_date_time.clear();
        }
        FieldType::DateTime => {
            out.min_date.clear();
            out.max_date.clear();
        }
        _ => {}
    }

    out.field_type = next;
    out
}

/// Runs the type-change protocol.
///
/// Returns the updated record, or `None` when switching would not change
/// anything.
#[must_use]
pub fn change_type(field: &FieldDefinition, next: FieldType) -> Option<FieldDefinition> {
    let updated = apply_type_defaults(field, next);
    (updated != *field).then_some(updated)
}

/// Builds the built-in starter fields, each with a fresh id.
pub fn default_fields(ids: &dyn IdentityAllocator) -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new(ids)
            .label("Full name")
            .name("fullName")
            .placeholder("John Doe"),
        FieldDefinition::new(ids)
            .label("Email")
            .name("email")
            .of_type(FieldType::Email)
            .placeholder("you@example.com")
            .required(),
        FieldDefinition::new(ids)
            .label("About you")
            .name("about")
            .of_type(FieldType::Textarea)
            .helper_text("A short bio"),
        FieldDefinition::new(ids)
            .label("Role")
            .name("role")
            .of_type(FieldType::Select)
            .options("Engineer, Designer, Product"),
        FieldDefinition::new(ids)
            .label("Accept terms")
            .name("terms")
            .of_type(FieldType::Checkbox)
            .required(),
    ]
}
