use std::collections::HashMap;

/// Per-cell output substitutions computed during validation.
///
/// Keyed by `(table, row, column slot)`. Ingested values are never
/// modified; emission reads the overlay first.
#[derive(Debug, Clone, Default)]
pub struct ValueOverlay {
    values: HashMap<(String, usize, usize), String>,
}

impl ValueOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, table: &str, row: usize, slot: usize, value: impl Into<String>) {
        self.values
            .insert((table.to_string(), row, slot), value.into());
    }

    pub fn get(&self, table: &str, row: usize, slot: usize) -> Option<&str> {
        self.values
            .get(&(table.to_string(), row, slot))
            .map(String::as_str)
    }

    /// Absorbs a worker's overlay. Tables never share keys, so existing
    /// entries are kept on the rare collision.
    pub fn merge_from(&mut self, other: ValueOverlay) {
        for (key, value) in other.values {
            self.values.entry(key).or_insert(value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
