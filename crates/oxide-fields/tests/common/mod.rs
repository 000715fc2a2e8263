#![allow(dead_code)]

use std::sync::Arc;

use oxide_fields::{FieldCollection, FieldDefinition, FieldStore, SequentialAllocator};

/// A store holding the starter fields, with ids `field-1` ... `field-5`.
pub fn store() -> FieldStore {
    FieldStore::new(Arc::new(SequentialAllocator::new()))
}

/// A store holding no fields.
pub fn empty_store() -> FieldStore {
    FieldStore::with_fields(Arc::new(SequentialAllocator::new()), FieldCollection::new())
}

pub fn names(fields: &FieldCollection) -> Vec<String> {
    fields.iter().map(|f| f.name.clone()).collect()
}

pub fn field_at(store: &FieldStore, index: usize) -> FieldDefinition {
    store
        .fields()
        .as_slice()
        .get(index)
        .cloned()
        .unwrap_or_else(|| panic!("no field at index {index}"))
}

/// Asserts two collections are equal except for field ids.
pub fn assert_equal_up_to_ids(left: &FieldCollection, right: &FieldCollection) {
    assert_eq!(left.len(), right.len(), "collections differ in length");
    for (a, b) in left.iter().zip(right.iter()) {
        let mut b = b.clone();
        b.id = a.id.clone();
        assert_eq!(a, &b);
    }
}
