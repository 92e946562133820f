//! Language pack: the translations for one language.
//!
//! A pack is the parsed top-level JSON object of a `<code>.json` file. Values
//! are left as JSON so that both flat files and files grouping keys into
//! nested objects can be read without a schema.

use serde_json::{Map, Value};
use std::ops::Index;

static NULL: Value = Value::Null;

/// Translations for a single language, as parsed from its JSON file.
///
/// Values are either plain strings or nested objects. Lookups accept dotted
/// paths (`"menu.title"`) to reach into nested objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LanguagePack {
    entries: Map<String, Value>,
}

impl LanguagePack {
    pub fn new(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    /// Raw value for `key`. A top-level key containing dots is matched before
    /// the key is treated as a path.
    pub fn get(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.entries.get(key) {
            return Some(value);
        }

        let mut parts = key.split('.');
        let first = parts.next()?;
        parts.try_fold(self.entries.get(first)?, |value, part| {
            value.as_object()?.get(part)
        })
    }

    /// Localized text for `key`, if it exists and is a string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Map<String, Value>> for LanguagePack {
    fn from(entries: Map<String, Value>) -> Self {
        Self::new(entries)
    }
}

impl Index<&str> for LanguagePack {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}
