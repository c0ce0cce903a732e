//! Raw text variable storage shared by globals, characters, items and factions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// String-keyed text storage.
///
/// Values are opaque text; numeric readers parse on demand. Reading an absent
/// key yields an empty string, writing always overwrites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarStore {
    values: HashMap<String, String>,
}

impl VarStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value, empty when absent.
    pub fn get_value(&self, name: &str) -> String {
        self.values.get(name).cloned().unwrap_or_default()
    }

    /// Write a value, replacing any previous one.
    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Remove a value, returning it if it was present.
    pub fn remove_value(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all stored entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_value_is_empty() {
        let store = VarStore::new();
        assert_eq!(store.get_value("missing"), "");
        assert!(!store.contains("missing"));
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = VarStore::new();
        store.set_value("counter", "1");
        store.set_value("counter", "2");

        assert_eq!(store.get_value("counter"), "2");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_value() {
        let mut store = VarStore::new();
        store.set_value("flag", "yes");

        assert_eq!(store.remove_value("flag").as_deref(), Some("yes"));
        assert!(store.is_empty());
    }
}
