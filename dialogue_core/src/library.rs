//! Named conditions loaded from content documents.
//!
//! A document maps condition names to condition configurations, in JSON:
//!
//! ```json
//! { "can_trade": { "and": ["npc_available", { "u_has_cash": 100 }] } }
//! ```
//!
//! or in TOML:
//!
//! ```toml
//! night = { not = "is_day" }
//! [armed]
//! u_has_wielded_with_flag = "SHARP"
//! ```

use std::collections::BTreeMap;

use serde_json::Value;

use crate::condition::{Condition, ConditionCompiler};
use crate::dialogue::TalkContext;
use crate::error::{LoadError, LoadResult};
use crate::json::as_object;

/// Compiled conditions looked up by name.
pub struct ConditionLibrary<T> {
    conditions: BTreeMap<String, Condition<T>>,
}

impl<T: TalkContext + 'static> Default for ConditionLibrary<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TalkContext + 'static> ConditionLibrary<T> {
    pub fn new() -> Self {
        Self {
            conditions: BTreeMap::new(),
        }
    }

    pub fn from_json_str(text: &str) -> LoadResult<Self> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_document(&document)
    }

    pub fn from_toml_str(text: &str) -> LoadResult<Self> {
        let document: Value = toml::from_str(text)?;
        Self::from_document(&document)
    }

    /// Compile every entry of a parsed document.
    ///
    /// All entries are attempted; failures are returned together, each
    /// wrapped in [`LoadError::Entry`] naming the entry.
    pub fn from_document(document: &Value) -> LoadResult<Self> {
        let entries = as_object(document, "document")?;
        let compiler = ConditionCompiler::new();
        let mut library = Self::new();
        let mut failures = Vec::new();

        for (name, config) in entries {
            match compiler.compile(config) {
                Ok(condition) => library.insert(name.clone(), condition),
                Err(e) => {
                    tracing::error!(entry = %name, "Failed to load condition: {}", e);
                    failures.push(LoadError::Entry {
                        name: name.clone(),
                        source: Box::new(e),
                    });
                }
            }
        }

        match failures.len() {
            0 => {
                tracing::debug!(count = library.len(), "Loaded condition library");
                Ok(library)
            }
            1 => Err(failures.remove(0)),
            _ => Err(LoadError::Entries(failures)),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, condition: Condition<T>) {
        self.conditions.insert(name.into(), condition);
    }

    pub fn get(&self, name: &str) -> Option<&Condition<T>> {
        self.conditions.get(name)
    }

    /// Evaluate a named condition. Unknown names are reported and false.
    pub fn evaluate(&self, name: &str, d: &T) -> bool {
        match self.get(name) {
            Some(condition) => condition.evaluate(d),
            None => {
                tracing::warn!("Unknown condition '{}'", name);
                false
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}
