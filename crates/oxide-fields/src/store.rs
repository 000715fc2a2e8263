//! The field store: an ordered collection of field definitions and the
//! transitions applied to it.
//!
//! Every transition is a function from the current collection and a payload
//! to a new collection. Transitions never fail: a payload that references a
//! missing field, an out-of-range move, or a malformed replacement leaves the
//! collection unchanged.
//!
//! The store is single-threaded by construction. Each call to
//! [`FieldStore::dispatch`] applies to the state left by the previous call,
//! so the last write always wins without any locking.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::codec;
use crate::config::StoreConfig;
use crate::defaults;
use crate::error::Result;
use crate::field::{FieldDefinition, FieldType};
use crate::id::{allocate_unused, FieldId, IdentityAllocator};
use crate::persistence::{FileSnapshotBackend, SnapshotBackend};

/// Ordered field definitions with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldCollection {
    fields: Vec<FieldDefinition>,
}

impl FieldCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection, or `None` if two fields share an id.
    #[must_use]
    pub fn from_fields(fields: Vec<FieldDefinition>) -> Option<Self> {
        let mut seen = HashSet::with_capacity(fields.len());
        if fields.iter().all(|f| seen.insert(&f.id)) {
            Some(Self { fields })
        } else {
            None
        }
    }

    /// Builds a collection from a JSON array of field records.
    ///
    /// Returns `None` unless `value` is an array whose every element is a
    /// complete field record and whose ids are unique.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let items = value.as_array()?;
        let fields = items
            .iter()
            .map(|item| {
                if item.is_object() {
                    serde_json::from_value(item.clone()).ok()
                } else {
                    None
                }
            })
            .collect::<Option<Vec<FieldDefinition>>>()?;
        Self::from_fields(fields)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the fields as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Iterates over the fields in order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldDefinition> {
        self.fields.iter()
    }

    /// Looks up a field by id.
    #[must_use]
    pub fn get(&self, id: &FieldId) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == *id)
    }

    /// Returns the index of the field with the given id.
    #[must_use]
    pub fn position(&self, id: &FieldId) -> Option<usize> {
        self.fields.iter().position(|f| f.id == *id)
    }

    /// Consumes the collection and returns the fields.
    #[must_use]
    pub fn into_vec(self) -> Vec<FieldDefinition> {
        self.fields
    }
}

impl<'a> IntoIterator for &'a FieldCollection {
    type Item = &'a FieldDefinition;
    type IntoIter = std::slice::Iter<'a, FieldDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// A transition of the field store.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldAction {
    /// Append a new field labelled `Field {N+1}`.
    Add,
    /// Replace the field with the same id.
    Update(FieldDefinition),
    /// Remove the field with this id.
    Remove(FieldId),
    /// Move the field at `from` to index `to`.
    Move {
        /// Current index.
        from: isize,
        /// Target index.
        to: isize,
    },
    /// Insert a copy of this field right after it.
    Duplicate(FieldDefinition),
    /// Remove every field.
    Clear,
    /// Replace the collection with the built-in starter fields.
    ResetDefaults,
    /// Replace the collection with a JSON array of field records.
    SetAll(Value),
}

impl FieldAction {
    /// Returns the action name, for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Update(_) => "UPDATE",
            Self::Remove(_) => "REMOVE",
            Self::Move { .. } => "MOVE",
            Self::Duplicate(_) => "DUPLICATE",
            Self::Clear => "CLEAR",
            Self::ResetDefaults => "RESET_DEFAULTS",
            Self::SetAll(_) => "SET_ALL",
        }
    }
}

/// Applies one action to a collection and returns the resulting collection.
pub fn reduce(
    state: &FieldCollection,
    action: FieldAction,
    ids: &dyn IdentityAllocator,
) -> FieldCollection {
    match action {
        FieldAction::Add => add(state, ids),
        FieldAction::Update(field) => update(state, field),
        FieldAction::Remove(id) => remove(state, &id),
        FieldAction::Move { from, to } => move_index(state, from, to),
        FieldAction::Duplicate(field) => duplicate(state, &field, ids),
        FieldAction::Clear => FieldCollection::new(),
        FieldAction::ResetDefaults => FieldCollection {
            fields: defaults::default_fields(ids),
        },
        FieldAction::SetAll(candidate) => {
            FieldCollection::from_value(&candidate).unwrap_or_else(|| state.clone())
        }
    }
}

fn add(state: &FieldCollection, ids: &dyn IdentityAllocator) -> FieldCollection {
    let label = format!("Field {}", state.len() + 1);
    let mut fields = state.fields.clone();
    fields.push(FieldDefinition::with_id(fresh_id(state, ids)).label(label));
    FieldCollection { fields }
}

/// Allocates an id no field of `state` uses yet.
fn fresh_id(state: &FieldCollection, ids: &dyn IdentityAllocator) -> FieldId {
    allocate_unused(ids, |id| state.get(id).is_none())
}

fn update(state: &FieldCollection, field: FieldDefinition) -> FieldCollection {
    let Some(idx) = state.position(&field.id) else {
        return state.clone();
    };
    let mut fields = state.fields.clone();
    fields[idx] = field;
    FieldCollection { fields }
}

fn remove(state: &FieldCollection, id: &FieldId) -> FieldCollection {
    FieldCollection {
        fields: state.iter().filter(|f| f.id != *id).cloned().collect(),
    }
}

fn move_index(state: &FieldCollection, from: isize, to: isize) -> FieldCollection {
    let len = state.len();
    let (Ok(from), Ok(to)) = (usize::try_from(from), usize::try_from(to)) else {
        return state.clone();
    };
    if from >= len || to >= len {
        return state.clone();
    }
    let mut fields = state.fields.clone();
    let item = fields.remove(from);
    fields.insert(to, item);
    FieldCollection { fields }
}

fn duplicate(
    state: &FieldCollection,
    source: &FieldDefinition,
    ids: &dyn IdentityAllocator,
) -> FieldCollection {
    let Some(idx) = state.position(&source.id) else {
        return state.clone();
    };
    let mut clone = source.clone();
    clone.id = fresh_id(state, ids);
    clone.name = format!("{}_copy", source.name);
    clone.label = format!("{} (copy)", source.label);

    let mut fields = state.fields.clone();
    fields.insert(idx + 1, clone);
    FieldCollection { fields }
}

/// Where a store writes its snapshot.
struct Persistence {
    backend: Box<dyn SnapshotBackend>,
    key: String,
}

/// Holds the current field collection and applies transitions to it.
///
/// Readers borrow the collection through [`fields`](Self::fields); every
/// change goes through [`dispatch`](Self::dispatch) or one of its
/// convenience wrappers. When persistence is configured, a snapshot is
/// written after every transition that changed the collection. Snapshot
/// failures are logged and otherwise ignored.
pub struct FieldStore {
    fields: FieldCollection,
    ids: Arc<dyn IdentityAllocator>,
    persistence: Option<Persistence>,
}

impl std::fmt::Debug for FieldStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldStore")
            .field("fields", &self.fields)
            .field(
                "storage_key",
                &self.persistence.as_ref().map(|p| p.key.as_str()),
            )
            .finish_non_exhaustive()
    }
}

impl FieldStore {
    /// Creates an in-memory store holding the built-in starter fields.
    pub fn new(ids: Arc<dyn IdentityAllocator>) -> Self {
        let fields = FieldCollection {
            fields: defaults::default_fields(ids.as_ref()),
        };
        Self::with_fields(ids, fields)
    }

    /// Creates an in-memory store holding `fields`.
    pub fn with_fields(ids: Arc<dyn IdentityAllocator>, fields: FieldCollection) -> Self {
        Self {
            fields,
            ids,
            persistence: None,
        }
    }

    /// Creates a store backed by a snapshot.
    ///
    /// The snapshot stored under `key` is loaded if it is present and holds a
    /// well-formed array of field records; otherwise the store starts with
    /// the built-in starter fields.
    pub fn with_persistence(
        ids: Arc<dyn IdentityAllocator>,
        backend: Box<dyn SnapshotBackend>,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let fields = load_snapshot(backend.as_ref(), &key).unwrap_or_else(|| FieldCollection {
            fields: defaults::default_fields(ids.as_ref()),
        });
        Self {
            fields,
            ids,
            persistence: Some(Persistence { backend, key }),
        }
    }

    /// Creates a store as described by `config`.
    ///
    /// With `persist` set, snapshots live as JSON files in
    /// `config.storage_dir`.
    pub fn from_config(config: &StoreConfig, ids: Arc<dyn IdentityAllocator>) -> Self {
        if config.persist {
            let backend = FileSnapshotBackend::new(&config.storage_dir);
            Self::with_persistence(ids, Box::new(backend), config.storage_key.clone())
        } else {
            Self::new(ids)
        }
    }

    /// Returns the current collection.
    #[must_use]
    pub fn fields(&self) -> &FieldCollection {
        &self.fields
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether the store holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a field by id.
    #[must_use]
    pub fn get(&self, id: &FieldId) -> Option<&FieldDefinition> {
        self.fields.get(id)
    }

    /// Applies an action. Returns whether the collection changed.
    pub fn dispatch(&mut self, action: FieldAction) -> bool {
        let kind = action.kind();
        let next = reduce(&self.fields, action, self.ids.as_ref());
        if next == self.fields {
            debug!(action = kind, "Transition left fields unchanged");
            return false;
        }

        self.fields = next;
        debug!(action = kind, len = self.fields.len(), "Applied transition");
        self.save_snapshot();
        true
    }

    /// Appends a new field.
    pub fn add_field(&mut self) -> bool {
        self.dispatch(FieldAction::Add)
    }

    /// Replaces the field with the same id as `field`.
    pub fn update_field(&mut self, field: FieldDefinition) -> bool {
        self.dispatch(FieldAction::Update(field))
    }

    /// Removes the field with the given id.
    pub fn remove_field(&mut self, id: &FieldId) -> bool {
        self.dispatch(FieldAction::Remove(id.clone()))
    }

    /// Moves the field at `from` to index `to`.
    pub fn move_field(&mut self, from: isize, to: isize) -> bool {
        self.dispatch(FieldAction::Move { from, to })
    }

    /// Inserts a copy of `field` right after it.
    pub fn duplicate_field(&mut self, field: &FieldDefinition) -> bool {
        self.dispatch(FieldAction::Duplicate(field.clone()))
    }

    /// Removes every field.
    pub fn clear(&mut self) -> bool {
        self.dispatch(FieldAction::Clear)
    }

    /// Replaces the collection with the built-in starter fields.
    pub fn reset_defaults(&mut self) -> bool {
        self.dispatch(FieldAction::ResetDefaults)
    }

    /// Replaces the collection with a JSON array of field records.
    pub fn set_all(&mut self, candidate: Value) -> bool {
        self.dispatch(FieldAction::SetAll(candidate))
    }

    /// Switches a field to another type, filling that type's defaults.
    ///
    /// Nothing is dispatched when the id is unknown or the switch would not
    /// change the record.
    pub fn change_type(&mut self, id: &FieldId, next: FieldType) -> bool {
        let Some(updated) = self
            .fields
            .get(id)
            .and_then(|field| defaults::change_type(field, next))
        else {
            return false;
        };
        self.dispatch(FieldAction::Update(updated))
    }

    /// Imports a schema, replacing the whole collection.
    ///
    /// On error the collection is left untouched.
    pub fn import_json(&mut self, text: &str) -> Result<bool> {
        let imported = match codec::import_json(text, self.ids.as_ref()) {
            Ok(imported) => imported,
            Err(err) => {
                warn!(error = %err, "Rejected schema import");
                return Err(err);
            }
        };
        let candidate = serde_json::to_value(&imported)?;
        Ok(self.dispatch(FieldAction::SetAll(candidate)))
    }

    /// Exports the current collection as an indented JSON schema.
    pub fn export_json(&self) -> Result<String> {
        codec::export_json(&self.fields)
    }

    fn save_snapshot(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let snapshot = match serde_json::to_string(&self.fields) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "Failed to serialize field snapshot");
                return;
            }
        };
        if let Err(err) = persistence.backend.save(&persistence.key, &snapshot) {
            warn!(key = %persistence.key, error = %err, "Failed to save field snapshot");
        }
    }
}

fn load_snapshot(backend: &dyn SnapshotBackend, key: &str) -> Option<FieldCollection> {
    let raw = match backend.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!(key, "No field snapshot found, using defaults");
            return None;
        }
        Err(err) => {
            warn!(key, error = %err, "Failed to read field snapshot, using defaults");
            return None;
        }
    };
    let Ok(value) = serde_json::from_str::<Value>(&raw) else {
        warn!(key, "Field snapshot is not valid JSON, using defaults");
        return None;
    };
    let fields = FieldCollection::from_value(&value);
    match &fields {
        Some(fields) => info!(key, len = fields.len(), "Loaded field snapshot"),
        None => warn!(key, "Field snapshot is not an array of fields, using defaults"),
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialAllocator;
    use crate::persistence::MemorySnapshotBackend;
    use serde_json::json;

    fn store() -> FieldStore {
        FieldStore::new(Arc::new(SequentialAllocator::new()))
    }

    fn names(store: &FieldStore) -> Vec<&str> {
        store.fields().iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_starts_with_defaults() {
        let store = store();
        assert_eq!(names(&store), vec!["fullName", "email", "about", "role", "terms"]);
    }

    #[test]
    fn test_add_labels_by_length() {
        let mut store = store();
        assert!(store.add_field());
        let last = store.fields().as_slice().last().unwrap();
        assert_eq!(last.label, "Field 6");
        assert_eq!(last.id.as_str(), "field-6");
    }

    #[test]
    fn test_add_label_can_repeat_after_remove() {
        let mut store = FieldStore::with_fields(
            Arc::new(SequentialAllocator::new()),
            FieldCollection::new(),
        );
        store.add_field();
        store.add_field();
        let first = store.fields().as_slice()[0].id.clone();
        store.remove_field(&first);
        store.add_field();

        let labels: Vec<_> = store.fields().iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Field 2", "Field 2"]);
    }

    #[test]
    fn test_update_replaces_whole_record() {
        let mut store = store();
        let mut field = store.fields().as_slice()[0].clone();
        field.label = "Your name".into();
        field.required = true;

        assert!(store.update_field(field.clone()));
        assert_eq!(store.get(&field.id), Some(&field));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = store();
        let before = store.fields().clone();
        let stranger = FieldDefinition::with_id(FieldId::new("missing"));

        assert!(!store.update_field(stranger));
        assert_eq!(store.fields(), &before);
    }

    #[test]
    fn test_remove() {
        let mut store = store();
        let id = store.fields().as_slice()[1].id.clone();
        assert!(store.remove_field(&id));
        assert_eq!(names(&store), vec!["fullName", "about", "role", "terms"]);
        assert!(!store.remove_field(&id));
    }

    #[test]
    fn test_move() {
        let mut store = store();
        assert!(store.move_field(0, 2));
        assert_eq!(names(&store), vec!["email", "about", "fullName", "role", "terms"]);
        assert!(store.move_field(4, 0));
        assert_eq!(names(&store), vec!["terms", "email", "about", "fullName", "role"]);
    }

    #[test]
    fn test_move_out_of_range_is_noop() {
        let mut store = store();
        let before = store.fields().clone();
        assert!(!store.move_field(0, -1));
        assert!(!store.move_field(0, 5));
        assert!(!store.move_field(7, 0));
        assert!(!store.move_field(2, 2));
        assert_eq!(store.fields(), &before);
    }

    #[test]
    fn test_duplicate_inserts_after_source() {
        let mut store = store();
        let source = store.fields().as_slice()[1].clone();
        assert!(store.duplicate_field(&source));

        let fields = store.fields().as_slice();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[2].name, "email_copy");
        assert_eq!(fields[2].label, "Email (copy)");
        assert_eq!(fields[2].field_type, source.field_type);
        assert_eq!(fields[2].id.as_str(), "field-6");
    }

    #[test]
    fn test_duplicate_absent_source_is_noop() {
        let mut store = store();
        let stranger = FieldDefinition::with_id(FieldId::new("missing"));
        assert!(!store.duplicate_field(&stranger));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_clear_and_reset() {
        let mut store = store();
        let old_ids: Vec<_> = store.fields().iter().map(|f| f.id.clone()).collect();
        assert!(store.clear());
        assert!(store.is_empty());
        assert!(!store.clear());

        assert!(store.reset_defaults());
        assert_eq!(store.len(), 5);
        assert!(store.fields().iter().all(|f| !old_ids.contains(&f.id)));
    }

    #[test]
    fn test_set_all_requires_field_array() {
        let mut store = store();
        let before = store.fields().clone();

        assert!(!store.set_all(json!({"fields": []})));
        assert!(!store.set_all(json!([1, 2])));
        assert!(!store.set_all(json!([{"name": "no id"}])));
        assert!(!store.set_all(json!([
            {"id": "a", "name": "a", "label": "A", "type": "text"},
            {"id": "a", "name": "b", "label": "B", "type": "text"}
        ])));
        assert_eq!(store.fields(), &before);

        assert!(store.set_all(json!([
            {"id": "a", "name": "a", "label": "A", "type": "text"}
        ])));
        assert_eq!(names(&store), vec!["a"]);
    }

    #[test]
    fn test_change_type_dispatches_only_on_difference() {
        let mut store = store();
        let id = store.fields().as_slice()[0].id.clone();
        assert!(!store.change_type(&id, FieldType::Text));
        assert!(store.change_type(&id, FieldType::Date));
        assert_eq!(store.get(&id).unwrap().field_type, FieldType::Date);
        assert!(!store.change_type(&FieldId::new("missing"), FieldType::Date));
    }

    #[test]
    fn test_import_failure_leaves_state() {
        let mut store = store();
        let before = store.fields().clone();
        assert!(store.import_json("{not json").is_err());
        assert!(store.import_json(r#"{"rows": []}"#).is_err());
        assert_eq!(store.fields(), &before);
    }

    #[test]
    fn test_snapshot_written_after_change() {
        let backend = MemorySnapshotBackend::new();
        let mut store = FieldStore::with_persistence(
            Arc::new(SequentialAllocator::new()),
            Box::new(backend.clone()),
            "fields",
        );
        assert!(backend.get("fields").is_none());

        store.clear();
        assert_eq!(backend.get("fields").as_deref(), Some("[]"));
    }

    #[test]
    fn test_snapshot_loaded_when_well_formed() {
        let backend = MemorySnapshotBackend::new();
        backend.insert(
            "fields",
            r#"[{"id":"x","name":"x","label":"X","type":"number"}]"#,
        );
        let store = FieldStore::with_persistence(
            Arc::new(SequentialAllocator::new()),
            Box::new(backend),
            "fields",
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.fields().as_slice()[0].field_type, FieldType::Number);
    }

    #[test]
    fn test_malformed_snapshot_falls_back_to_defaults() {
        let backend = MemorySnapshotBackend::new();
        backend.insert("fields", r#"{"oops": true}"#);
        let store = FieldStore::with_persistence(
            Arc::new(SequentialAllocator::new()),
            Box::new(backend),
            "fields",
        );
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_add_skips_ids_already_present() {
        let mut store = store();
        assert!(store.set_all(json!([
            {"id": "field-6", "name": "a", "label": "A", "type": "text"}
        ])));
        assert!(store.add_field());

        let ids: Vec<_> = store.fields().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["field-6", "field-7"]);

        assert!(store.remove_field(&FieldId::new("field-6")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_skips_ids_already_present() {
        let mut store = store();
        store.set_all(json!([
            {"id": "field-6", "name": "a", "label": "A", "type": "text"},
            {"id": "field-7", "name": "b", "label": "B", "type": "text"}
        ]));
        let source = store.fields().as_slice()[0].clone();
        assert!(store.duplicate_field(&source));

        let ids: Vec<_> = store.fields().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["field-6", "field-8", "field-7"]);
    }
}
