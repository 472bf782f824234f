//! Derived-schema cache

use crate::error::Result;
use crate::schema::RecordSchema;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Memoizes a derived target-format schema by structural fingerprint.
///
/// Each decoded record may carry its own schema instance even when
/// logically identical, so the cache keys on the structural fingerprint
/// rather than object identity. Entries live as long as the owning
/// transformer; the set of distinct schemas in one job is bounded by
/// configuration, not record volume, so the cache never evicts.
///
/// Owned by exactly one transformer instance and mutated only from the
/// thread driving it.
#[derive(Debug)]
pub struct SchemaCache<T> {
    entries: HashMap<u64, T>,
}

impl<T> SchemaCache<T> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Number of distinct schemas resolved so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the derived schema for `schema`, deriving and inserting it on
    /// first sight.
    ///
    /// `derive` must be a pure function of the schema's structure; it is
    /// never called again for a structurally equal schema.
    pub fn resolve_with(
        &mut self,
        schema: &RecordSchema,
        derive: impl FnOnce(&RecordSchema) -> Result<T>,
    ) -> Result<&T> {
        match self.entries.entry(schema.fingerprint()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(derive(schema)?)),
        }
    }
}

impl<T> Default for SchemaCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
