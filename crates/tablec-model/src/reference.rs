//! Global side tables for cross-sheet lookups.
//!
//! Both indexes are first-write-wins: once a pair is recorded, later
//! producers never overwrite it.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Raw value to resolved value for one origin column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginValues {
    values: HashMap<String, String>,
}

impl OriginValues {
    pub fn resolve(&self, raw: &str) -> Option<&str> {
        self.values.get(raw).map(String::as_str)
    }

    /// True when any value resolves to something other than itself.
    pub fn has_substitution(&self) -> bool {
        self.values.iter().any(|(raw, resolved)| raw != resolved)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Lowercase origin name (`table/field`) to its values.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    origins: HashMap<String, OriginValues>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `raw`, resolving to `linked` when that is non-empty and to
    /// `raw` itself otherwise.
    pub fn record(&mut self, origin: &str, raw: &str, linked: &str) {
        let resolved = if linked.is_empty() { raw } else { linked };
        let values = &mut self.origins.entry(origin.to_lowercase()).or_default().values;
        if let Entry::Vacant(slot) = values.entry(raw.to_string()) {
            slot.insert(resolved.to_string());
        }
    }

    /// Absorbs another index, keeping pairs already present.
    pub fn merge_from(&mut self, other: ReferenceIndex) {
        for (origin, incoming) in other.origins {
            let values = &mut self.origins.entry(origin).or_default().values;
            for (raw, resolved) in incoming.values {
                values.entry(raw).or_insert(resolved);
            }
        }
    }

    pub fn origin(&self, name: &str) -> Option<&OriginValues> {
        self.origins.get(name)
    }

    pub fn origin_count(&self) -> usize {
        self.origins.len()
    }
}

/// Observed array lengths keyed by `(table, column slot, row)`.
#[derive(Debug, Clone, Default)]
pub struct ArraySizeIndex {
    sizes: HashMap<(String, usize, usize), usize>,
}

impl ArraySizeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, table: &str, slot: usize, row: usize, size: usize) {
        self.sizes
            .entry((table.to_string(), slot, row))
            .or_insert(size);
    }

    pub fn get(&self, table: &str, slot: usize, row: usize) -> Option<usize> {
        self.sizes.get(&(table.to_string(), slot, row)).copied()
    }

    pub fn merge_from(&mut self, other: ArraySizeIndex) {
        for (key, size) in other.sizes {
            self.sizes.entry(key).or_insert(size);
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}
