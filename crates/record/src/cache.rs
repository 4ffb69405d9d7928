use std::collections::HashMap;

use rowkeep_core::ColumnValue;

/// Per-record memo of column values keyed by storage column name.
///
/// An entry is exactly what storage held at the last fetch or successful
/// write made through the owning record. Derived values memoised with
/// [`Record::cached_or_compute`](crate::Record::cached_or_compute) share the
/// same key space.
#[derive(Debug, Clone, Default)]
pub struct ColumnCache {
    entries: HashMap<String, ColumnValue>,
}

impl ColumnCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ColumnValue)>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ColumnValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ColumnValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<ColumnValue> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
