//! Reference group registry
//!
//! The set of functional groups species may be assigned to, keyed by a
//! stable group name with a free-text description. Iteration follows
//! insertion order so prompts and saved snapshots list groups the way the
//! template did.

use crate::core::error::DomainError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

/// Ordered name → description mapping of functional groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceGroupRegistry {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ReferenceGroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(name, description)` pairs.
    ///
    /// A repeated name overwrites the earlier description in place.
    pub fn from_pairs<N, D>(pairs: impl IntoIterator<Item = (N, D)>) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        let mut registry = Self::new();
        for (name, description) in pairs {
            registry.upsert(name, description);
        }
        registry
    }

    /// Parse a grouping template.
    ///
    /// Accepts the list form `[{"Group": "Description"}, ...]` and a plain
    /// object `{"Group": "Description"}`. Non-string descriptions are
    /// rendered as JSON text.
    pub fn from_template_value(value: &Value) -> Result<Self, DomainError> {
        let mut registry = Self::new();
        match value {
            Value::Array(items) => {
                for item in items {
                    let entry = item.as_object().ok_or_else(|| {
                        DomainError::InvalidTemplate(format!(
                            "expected an object per group, found {}",
                            item
                        ))
                    })?;
                    for (name, description) in entry {
                        registry.upsert(name.clone(), description_text(description));
                    }
                }
            }
            Value::Object(map) => {
                for (name, description) in map {
                    registry.upsert(name.clone(), description_text(description));
                }
            }
            other => {
                return Err(DomainError::InvalidTemplate(format!(
                    "expected a list or object of groups, found {}",
                    other
                )));
            }
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Add a new group. Existing groups are left untouched.
    ///
    /// Returns `true` if the group was added.
    pub fn put(&mut self, name: impl Into<String>, description: impl Into<String>) -> bool {
        let name = name.into();
        if self.index.contains_key(&name) {
            return false;
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, description.into()));
        true
    }

    /// Add a group or replace its description, keeping its position.
    pub fn upsert(&mut self, name: impl Into<String>, description: impl Into<String>) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = description.into(),
            None => {
                self.put(name, description);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(name, description)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, description)| (name.as_str(), description.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Render as the list-of-objects template form.
    pub fn to_template_value(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|(name, description)| {
                    let mut entry = serde_json::Map::new();
                    entry.insert(name.clone(), Value::String(description.clone()));
                    Value::Object(entry)
                })
                .collect(),
        )
    }
}

fn description_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl Serialize for ReferenceGroupRegistry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, description) in &self.entries {
            map.serialize_entry(name, description)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ReferenceGroupRegistry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_template_value(&value).map_err(serde::de::Error::custom)
    }
}
