//! In-memory backing store: the single source of truth for reads.

use serde_json::{Map, Value};

/// Flat mapping from key to JSON value.
///
/// Absence is represented by the key not being present; there is no
/// "absent" sentinel value. `Value::Null` is an ordinary value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BackingStore {
    entries: Map<String, Value>,
}

impl BackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Stores `value` under `key` and reports whether the effective value changed.
    pub fn set(&mut self, key: &str, value: Value) -> bool {
        let changed = self.entries.get(key) != Some(&value);
        self.entries.insert(key.to_string(), value);
        changed
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Inserts every entry of `other` whose key is not already present.
    /// Returns the number of keys filled in.
    pub fn fill_missing(&mut self, other: Map<String, Value>) -> usize {
        let mut filled = 0;
        for (key, value) in other {
            if !self.entries.contains_key(&key) {
                self.entries.insert(key, value);
                filled += 1;
            }
        }
        filled
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
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
