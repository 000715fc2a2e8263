//! Field identifiers and their allocators.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a field definition.
///
/// Assigned once at creation and never changed. Unique within a
/// [`FieldCollection`](crate::store::FieldCollection).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Wraps an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns up to five lowercase alphanumeric characters from the end of
    /// the identifier, used to build placeholder submission keys.
    #[must_use]
    pub fn short_key(&self) -> String {
        let chars: Vec<char> = self
            .0
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let start = chars.len().saturating_sub(5);
        chars[start..].iter().collect()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FieldId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Source of fresh field identifiers.
///
/// Every allocated id must differ from every id this allocator handed out
/// before.
pub trait IdentityAllocator: Send + Sync {
    /// Allocates a new identifier.
    fn allocate(&self) -> FieldId;
}

/// Allocates ids until one satisfies `is_free`.
///
/// Callers that hold ids from outside the allocator (imports, snapshots)
/// use this so a fresh id never repeats one already present.
pub fn allocate_unused(
    ids: &dyn IdentityAllocator,
    mut is_free: impl FnMut(&FieldId) -> bool,
) -> FieldId {
    loop {
        let id = ids.allocate();
        if is_free(&id) {
            return id;
        }
    }
}

/// Allocates random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidAllocator;

impl UuidAllocator {
    /// Creates a new UUID allocator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl IdentityAllocator for UuidAllocator {
    fn allocate(&self) -> FieldId {
        FieldId(Uuid::new_v4().to_string())
    }
}

/// Allocates `field-1`, `field-2`, ... in order.
///
/// Deterministic, for tests and reproducible fixtures.
#[derive(Debug)]
pub struct SequentialAllocator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialAllocator {
    /// Creates an allocator yielding `field-1`, `field-2`, ...
    #[must_use]
    pub fn new() -> Self {
        Self::with_prefix("field")
    }

    /// Creates an allocator yielding `{prefix}-1`, `{prefix}-2`, ...
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityAllocator for SequentialAllocator {
    fn allocate(&self) -> FieldId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        FieldId(format!("{}-{n}", self.prefix))
    }
}
