//! # oxide-fields
//!
//! Schema engine for interactive form builders.
//!
//! This crate provides:
//! - An ordered collection of field definitions and the transitions applied
//!   to it (add, update, remove, move, duplicate, clear, reset, replace)
//! - Per-type default attributes and the type-change protocol
//! - Required / email validation of submitted values
//! - JSON schema export, and import with normalization of external data
//! - Optional snapshot persistence
//!
//! Rendering is left to the caller: everything here is plain data in, plain
//! data out.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use oxide_fields::{FieldStore, FieldType, UuidAllocator};
//!
//! let mut store = FieldStore::new(Arc::new(UuidAllocator::new()));
//! assert_eq!(store.len(), 5);
//!
//! store.add_field();
//! let added = store.fields().as_slice()[5].clone();
//! assert_eq!(added.label, "Field 6");
//!
//! store.change_type(&added.id, FieldType::Date);
//! let schema = store.export_json().unwrap();
//! assert!(schema.contains("\"dateFormat\": \"DD/MM/YYYY\""));
//! ```
//!
//! ## Importing a schema
//!
//! ```rust
//! use std::sync::Arc;
//! use oxide_fields::{FieldStore, FieldType, SequentialAllocator};
//!
//! let mut store = FieldStore::new(Arc::new(SequentialAllocator::new()));
//! store.import_json(r#"{"fields": [{"name": "x"}]}"#).unwrap();
//!
//! let field = &store.fields().as_slice()[0];
//! assert_eq!(field.field_type, FieldType::Text);
//! assert!(!field.required);
//!
//! // a rejected import leaves the store as it was
//! assert!(store.import_json("not json").is_err());
//! assert_eq!(store.len(), 1);
//! ```
//!
//! ## Validation
//!
//! ```rust
//! use std::sync::Arc;
//! use oxide_fields::{FieldStore, PreviewSession, SequentialAllocator};
//!
//! let store = FieldStore::new(Arc::new(SequentialAllocator::new()));
//! let mut session = PreviewSession::new();
//! session.set_value("email", "not-an-email");
//!
//! // nothing is shown before the first submit
//! assert!(session.visible_errors(store.fields()).is_empty());
//!
//! let errors = session.submit(store.fields()).unwrap_err();
//! assert_eq!(errors.get("email"), Some("Invalid email"));
//! assert_eq!(errors.get("terms"), Some("Required"));
//! ```

pub mod codec;
pub mod config;
pub mod defaults;
mod error;
pub mod field;
pub mod id;
pub mod persistence;
pub mod preview;
pub mod store;
pub mod validation;

pub use config::StoreConfig;
pub use error::{FieldsError, Result, ValidationErrors};
pub use field::{FieldDefinition, FieldType, OptionList};
pub use id::{FieldId, IdentityAllocator, SequentialAllocator, UuidAllocator};
pub use preview::{FormValue, FormValues, PreviewSession, Submission};
pub use store::{FieldAction, FieldCollection, FieldStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::codec::{export_json, import_json};
    pub use crate::config::StoreConfig;
    pub use crate::defaults::{change_type, default_fields};
    pub use crate::error::{FieldsError, Result, ValidationErrors};
    pub use crate::field::{submission_key, FieldDefinition, FieldType, OptionList};
    pub use crate::id::{
        allocate_unused, FieldId, IdentityAllocator, SequentialAllocator, UuidAllocator,
    };
    pub use crate::persistence::{FileSnapshotBackend, MemorySnapshotBackend, SnapshotBackend};
    pub use crate::preview::{FormValue, FormValues, PreviewSession, Submission};
    pub use crate::store::{reduce, FieldAction, FieldCollection, FieldStore};
    pub use crate::validation::validate_form;
}
