//! Host configuration store.
//!
//! Entries carry a value plus the metadata the host UI needs to render
//! them: a type tag, a description, and an optional choice list. The
//! store is an in-memory map with optional JSON-file persistence; the
//! on-disk format belongs to the host and is not part of the plugin
//! contract.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::PluginResult;

/// Configuration value type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigType {
    /// Free-form string
    String,
    /// Numeric value
    Number,
    /// One of a fixed choice list
    Select,
}

/// One entry in a select-type choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOption {
    /// Label shown in the host UI
    pub label: String,
    /// Stored value
    pub value: String,
}

impl ConfigOption {
    /// Create a new choice-list entry.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A stored configuration entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Entry key
    pub key: String,
    /// Current value
    pub value: Value,
    /// Value type tag
    #[serde(rename = "type")]
    pub config_type: ConfigType,
    /// Description shown in the host UI
    pub description: String,
    /// Choice list for select-type entries
    #[serde(default)]
    pub options: Vec<ConfigOption>,
}

/// Host-owned configuration store.
pub struct ConfigStore {
    entries: RwLock<HashMap<String, ConfigEntry>>,
    path: Option<PathBuf>,
}

impl ConfigStore {
    /// Create an in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            path: None,
        }
    }

    /// Create a store persisted to a JSON file.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            path: Some(path.into()),
        }
    }

    /// Load entries from the backing file, if one is configured.
    ///
    /// A missing file is not an error; the store starts empty and the
    /// file is created on the first `save`.
    pub async fn load(&self) -> PluginResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }

        let raw = tokio::fs::read_to_string(path).await?;
        let loaded: HashMap<String, ConfigEntry> = serde_json::from_str(&raw)?;
        *self.entries.write().await = loaded;
        Ok(())
    }

    /// Save entries to the backing file, if one is configured.
    pub async fn save(&self) -> PluginResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let entries = self.entries.read().await;
        let raw = serde_json::to_string_pretty(&*entries)?;
        tokio::fs::write(path, raw).await?;
        Ok(())
    }

    /// Get the current value for a key.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).map(|e| e.value.clone())
    }

    /// Get a value as a string, falling back to a default.
    pub async fn get_str(&self, key: &str, default: &str) -> String {
        self.get(key)
            .await
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| default.to_string())
    }

    /// Get the full entry for a key, including its metadata.
    pub async fn entry(&self, key: &str) -> Option<ConfigEntry> {
        self.entries.read().await.get(key).cloned()
    }

    /// Add or replace an entry.
    ///
    /// Both the value and the UI metadata are written. Plugins that want
    /// add-if-missing semantics read the current value first and pass it
    /// back here, refreshing only the metadata.
    pub async fn add(
        &self,
        key: &str,
        value: Value,
        config_type: ConfigType,
        description: &str,
        options: Vec<ConfigOption>,
    ) -> PluginResult<()> {
        self.entries.write().await.insert(
            key.to_string(),
            ConfigEntry {
                key: key.to_string(),
                value,
                config_type,
                description: description.to_string(),
                options,
            },
        );
        self.save().await
    }

    /// Update the value of an existing entry, keeping its metadata.
    pub async fn set(&self, key: &str, value: Value) -> PluginResult<()> {
        {
            let mut entries = self.entries.write().await;
            let entry = entries
                .get_mut(key)
                .ok_or_else(|| crate::PluginError::Config(format!("unknown key: {key}")))?;
            entry.value = value;
        }
        self.save().await
    }

    /// Check whether a key exists.
    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    /// Get the number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_and_get() {
        let store = ConfigStore::new();
        store
            .add("mount", json!("/mnt/1wire"), ConfigType::String, "Mount path", vec![])
            .await
            .unwrap();

        assert_eq!(store.get("mount").await, Some(json!("/mnt/1wire")));
        assert_eq!(store.get_str("mount", "/tmp").await, "/mnt/1wire");
        assert!(store.contains("mount").await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_str_fallback() {
        let store = ConfigStore::new();
        assert_eq!(store.get_str("missing", "/mnt/1wire").await, "/mnt/1wire");
    }

    #[tokio::test]
    async fn test_set_requires_existing_key() {
        let store = ConfigStore::new();
        assert!(store.set("missing", json!("x")).await.is_err());

        store
            .add("level", json!("INFO"), ConfigType::Select, "Level", vec![])
            .await
            .unwrap();
        store.set("level", json!("DEBUG")).await.unwrap();
        assert_eq!(store.get("level").await, Some(json!("DEBUG")));
    }

    #[tokio::test]
    async fn test_add_refreshes_metadata() {
        let store = ConfigStore::new();
        store
            .add("level", json!("DEBUG"), ConfigType::Select, "old description", vec![])
            .await
            .unwrap();

        let options = vec![ConfigOption::new("INFO", "INFO"), ConfigOption::new("DEBUG", "DEBUG")];
        store
            .add("level", json!("DEBUG"), ConfigType::Select, "new description", options.clone())
            .await
            .unwrap();

        let entry = store.entry("level").await.unwrap();
        assert_eq!(entry.value, json!("DEBUG"));
        assert_eq!(entry.description, "new description");
        assert_eq!(entry.options, options);
    }

    #[tokio::test]
    async fn test_file_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = ConfigStore::with_file(&path);
        store.load().await.unwrap();
        store
            .add("mount", json!("/mnt/1wire"), ConfigType::String, "Mount path", vec![])
            .await
            .unwrap();

        let reloaded = ConfigStore::with_file(&path);
        reloaded.load().await.unwrap();
        assert_eq!(reloaded.get("mount").await, Some(json!("/mnt/1wire")));

        let entry = reloaded.entry("mount").await.unwrap();
        assert_eq!(entry.config_type, ConfigType::String);
        assert_eq!(entry.description, "Mount path");
    }

    #[tokio::test]
    async fn test_load_without_file_is_noop() {
        let store = ConfigStore::new();
        store.load().await.unwrap();
        assert!(store.is_empty().await);
    }
}
