//! Schema export and import.
//!
//! Export writes the collection as a plain JSON array with the internal ids
//! stripped. Import accepts a bare array, or an object carrying the array
//! under `fields` (checked first) or `schema`, and normalizes every record
//! into a complete field definition. Import is all-or-nothing: any problem
//! rejects the whole document.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::defaults::{DEFAULT_DATE_FORMAT, DEFAULT_DATE_TIME_FORMAT, DEFAULT_OPTIONS};
use crate::error::{FieldsError, Result};
use crate::field::FieldDefinition;
use crate::id::{allocate_unused, FieldId, IdentityAllocator};
use crate::store::FieldCollection;

/// Returns the schema records of a collection, without ids, in order.
pub fn export_schema(fields: &FieldCollection) -> Result<Vec<Value>> {
    fields
        .iter()
        .map(|field| {
            let mut record = serde_json::to_value(field)?;
            if let Value::Object(map) = &mut record {
                map.shift_remove("id");
            }
            Ok(record)
        })
        .collect()
}

/// Serializes the schema of a collection as JSON indented by two spaces.
pub fn export_json(fields: &FieldCollection) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export_schema(fields)?)?)
}

/// Finds the array of field records in an imported document.
///
/// Accepts, in priority order: a top-level array, an array under `fields`,
/// an array under `schema`.
#[must_use]
pub fn resolve_fields_array(document: &Value) -> Option<&Vec<Value>> {
    if let Some(records) = document.as_array() {
        return Some(records);
    }
    let object = document.as_object()?;
    object
        .get("fields")
        .and_then(Value::as_array)
        .or_else(|| object.get("schema").and_then(Value::as_array))
}

/// Parses and normalizes an imported schema document.
pub fn import_json(text: &str, ids: &dyn IdentityAllocator) -> Result<FieldCollection> {
    let document: Value =
        serde_json::from_str(text).map_err(|err| FieldsError::malformed(err.to_string()))?;
    import_value(&document, ids)
}

/// Normalizes an already-parsed schema document.
pub fn import_value(document: &Value, ids: &dyn IdentityAllocator) -> Result<FieldCollection> {
    let records = resolve_fields_array(document).ok_or_else(|| {
        FieldsError::malformed("expected an array, or an object with a `fields` or `schema` array")
    })?;

    let taken: HashSet<FieldId> = records.iter().filter_map(explicit_id).collect();
    let fields = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            normalize_with(record, ids, &taken).map_err(|err| match err {
                FieldsError::MalformedImport(reason) => {
                    FieldsError::malformed(format!("field {index}: {reason}"))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    FieldCollection::from_fields(fields)
        .ok_or_else(|| FieldsError::malformed("duplicate field ids"))
}

/// Fills the gaps of one imported record.
///
/// Values present in the record always win; generated defaults only fill
/// missing or `null` keys. Unknown keys are carried over unchanged.
pub fn normalize_record(record: &Value, ids: &dyn IdentityAllocator) -> Result<FieldDefinition> {
    normalize_with(record, ids, &HashSet::new())
}

/// Returns the id a record carries, if it is a string or a number.
fn explicit_id(record: &Value) -> Option<FieldId> {
    match record.get("id")? {
        Value::String(id) => Some(FieldId::new(id.as_str())),
        Value::Number(n) => Some(FieldId::new(n.to_string())),
        _ => None,
    }
}

/// Normalizes one record; generated ids avoid everything in `taken`.
fn normalize_with(
    record: &Value,
    ids: &dyn IdentityAllocator,
    taken: &HashSet<FieldId>,
) -> Result<FieldDefinition> {
    let input = record
        .as_object()
        .ok_or_else(|| FieldsError::malformed("field record must be an object"))?;
    let present = |key: &str| input.get(key).filter(|v| !v.is_null());

    let id = match present("id") {
        Some(Value::String(id)) => FieldId::new(id.as_str()),
        Some(Value::Number(n)) => FieldId::new(n.to_string()),
        Some(_) => return Err(FieldsError::malformed("`id` must be a string or number")),
        None => allocate_unused(ids, |id| !taken.contains(id)),
    };
    let legacy_format = present("format").and_then(Value::as_str);

    let mut out = Map::new();
    out.insert("label".into(), "Untitled".into());
    out.insert("name".into(), format!("field_{}", id.short_key()).into());
    out.insert("type".into(), "text".into());
    out.insert("fullWidth".into(), true.into());
    out.insert("placeholder".into(), "".into());
    out.insert("helperText".into(), "".into());
    out.insert(
        "options".into(),
        DEFAULT_OPTIONS.split(", ").collect::<Vec<_>>().into(),
    );
    out.insert(
        "dateFormat".into(),
        legacy_format.unwrap_or(DEFAULT_DATE_FORMAT).into(),
    );
    out.insert(
        "dateTimeFormat".into(),
        legacy_format.unwrap_or(DEFAULT_DATE_TIME_FORMAT).into(),
    );
    for key in ["minDate", "maxDate", "minDateTime", "maxDateTime"] {
        out.insert(key.into(), "".into());
    }

    for (key, value) in input {
        if value.is_null() && out.contains_key(key) {
            continue;
        }
        out.insert(key.clone(), value.clone());
    }

    out.insert("id".into(), id.as_str().into());
    for key in ["required", "multiple"] {
        let flag = input.get(key).is_some_and(truthy);
        out.insert(key.into(), flag.into());
    }

    serde_json::from_value(Value::Object(out)).map_err(|err| FieldsError::malformed(err.to_string()))
}

/// JSON truthiness: `null`, `false`, `0` and `""` are false.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
