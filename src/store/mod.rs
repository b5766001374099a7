// src/store/mod.rs

//! In-memory contents of the persisted `[Environment]` section.
//!
//! The store itself performs no IO and emits no signals; the
//! [`Dispatcher`](crate::engine::Dispatcher) wraps reads and writes with the
//! `retrieved_value` / `updated_value` signals, and the
//! [`ConfigDocument`](crate::config::ConfigDocument) handles persistence.

use indexmap::IndexMap;

use crate::types::Value;

/// Keys iterate in the order they appear in `[Environment]`; new keys are
/// appended, overwritten keys keep their place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataStore {
    values: IndexMap<String, Value>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(table: &toml::Table) -> Self {
        Self {
            values: table
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect(),
        }
    }

    pub fn to_table(&self) -> toml::Table {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), toml::Value::from(v.clone())))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for DataStore {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
