//! Flat key/value configuration assembled from a JSON file and the
//! process environment.

use crate::error::Result;
use moebridge_core::ConfigProvider;
use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::path::Path;

/// Environment variables with these prefixes are picked up by
/// [`FlatConfig::with_env`].
const ENV_PREFIXES: &[&str] = &["MAPPING_", "API_HOST_", "EVENT_ROUTING_"];

#[derive(Debug, Clone, Default)]
pub struct FlatConfig {
    values: HashMap<String, String>,
}

impl FlatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object. Scalars are stored as their string form and
    /// `null` entries are ignored.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let object: HashMap<String, Value> = serde_json::from_str(raw)?;
        Ok(Self::from_json_map(object))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let object: HashMap<String, Value> = serde_json::from_reader(file)?;
        Ok(Self::from_json_map(object))
    }

    fn from_json_map(object: HashMap<String, Value>) -> Self {
        let values = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect();
        Self { values }
    }

    /// Overlays the relevant process environment variables.
    #[must_use]
    pub fn with_env(self) -> Self {
        let vars = env::vars_os().filter_map(|(key, value)| {
            let key = key.into_string().ok()?;
            let value = value.into_string().ok()?;
            ENV_PREFIXES
                .iter()
                .any(|prefix| key.starts_with(prefix))
                .then_some((key, value))
        });
        self.with_overrides(vars)
    }

    #[must_use]
    pub fn with_overrides<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.set(key, value);
        }
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl ConfigProvider for FlatConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
