//! OWFS configuration extension.
//!
//! Ensures the mount-path and logging-level configuration entries
//! exist, applies the configured verbosity, and constructs the OWFS
//! bus/server pair into the shared slot every temperature sensor holds.

use async_trait::async_trait;
use serde_json::json;
use tracing::{Level, error, info, warn};

use brewd_plugin_sdk::{
    ConfigOption, ConfigStore, ConfigType, Extension, Host, PluginDescriptor, PluginResult,
};

use crate::owfs::{OwfsHandles, SharedHandles, shared_handles};

/// Key of the OWFS mount-path entry.
pub const OWFS_PATH_KEY: &str = "owfs_path";
/// Key of the logging-level entry.
pub const OWFS_LOGGING_KEY: &str = "owfs_logging_level";
/// Default OWFS mount path.
pub const DEFAULT_MOUNT: &str = "/mnt/1wire";
/// Default logging level.
pub const DEFAULT_LEVEL: &str = "INFO";

/// Configuration extension for the OWFS plugin.
pub struct OwfsConfig {
    descriptor: PluginDescriptor,
    handles: SharedHandles,
}

impl OwfsConfig {
    /// Create the extension with an empty shared slot.
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new("OwfsConfig", env!("CARGO_PKG_VERSION"))
                .with_description("OWFS bus configuration"),
            handles: shared_handles(),
        }
    }

    /// Get the shared slot to hand to sensor instances.
    pub fn handles(&self) -> SharedHandles {
        self.handles.clone()
    }

    /// Add an entry if missing, otherwise re-apply its current value
    /// with up-to-date description and options. The stored value never
    /// changes for an existing key.
    async fn ensure_entry(
        &self,
        config: &ConfigStore,
        key: &str,
        default: serde_json::Value,
        config_type: ConfigType,
        description: &str,
        options: Vec<ConfigOption>,
    ) {
        let value = match config.get(key).await {
            Some(current) => current,
            None => default,
        };
        if let Err(e) = config.add(key, value, config_type, description, options).await {
            warn!("unable to add or update config {key}: {e}");
        }
    }

    /// Map a configured level string to a verbosity. Anything outside
    /// INFO/DEBUG/ERROR falls back to INFO.
    pub fn verbosity_for(level: &str) -> Level {
        match level {
            "DEBUG" => Level::DEBUG,
            "ERROR" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Construct the bus/server pair from the configured mount path.
    /// On failure the shared slot stays `None`; sensors keep running
    /// without a bus and the host is never taken down.
    async fn init_owfs(&self, host: &Host) {
        let mount = host.config().get_str(OWFS_PATH_KEY, DEFAULT_MOUNT).await;
        info!("initializing OWFS bus at {mount}");

        match OwfsHandles::open(&mount) {
            Ok(pair) => {
                *self.handles.write().await = Some(pair);
                info!("OWFS bus and server initialized");
            }
            Err(e) => {
                error!("failed to initialize OWFS bus or server: {e}");
            }
        }
    }
}

impl Default for OwfsConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extension for OwfsConfig {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    async fn init(&self, host: &Host) -> PluginResult<()> {
        info!("initializing OWFS configuration");

        self.ensure_entry(
            host.config(),
            OWFS_PATH_KEY,
            json!(DEFAULT_MOUNT),
            ConfigType::String,
            "OWFS mount path",
            vec![],
        )
        .await;
        self.ensure_entry(
            host.config(),
            OWFS_LOGGING_KEY,
            json!(DEFAULT_LEVEL),
            ConfigType::Select,
            "OWFS logging level",
            vec![
                ConfigOption::new("INFO", "INFO"),
                ConfigOption::new("DEBUG", "DEBUG"),
                ConfigOption::new("ERROR", "ERROR"),
            ],
        )
        .await;

        let configured = host.config().get_str(OWFS_LOGGING_KEY, DEFAULT_LEVEL).await;
        let level = Self::verbosity_for(&configured);
        info!("setting log level to {level}");
        host.set_log_level(level);

        self.init_owfs(host).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewd_plugin_sdk::{ConfigStore, LevelReload};
    use std::sync::{Arc, Mutex};

    // Seed the mount path the way a host with persisted config would.
    async fn host_with_mount(mount: &str) -> Host {
        let host = Host::new(ConfigStore::new());
        host.config()
            .add(OWFS_PATH_KEY, json!(mount), ConfigType::String, "OWFS mount path", vec![])
            .await
            .unwrap();
        host
    }

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(OwfsConfig::verbosity_for("INFO"), Level::INFO);
        assert_eq!(OwfsConfig::verbosity_for("DEBUG"), Level::DEBUG);
        assert_eq!(OwfsConfig::verbosity_for("ERROR"), Level::ERROR);
        assert_eq!(OwfsConfig::verbosity_for("TRACE"), Level::INFO);
        assert_eq!(OwfsConfig::verbosity_for(""), Level::INFO);
    }

    #[tokio::test]
    async fn test_init_creates_default_entries() {
        let host = Host::new(ConfigStore::new());
        let ext = OwfsConfig::new();

        ext.init(&host).await.unwrap();

        assert_eq!(host.config().get(OWFS_PATH_KEY).await, Some(json!(DEFAULT_MOUNT)));
        assert_eq!(host.config().get(OWFS_LOGGING_KEY).await, Some(json!("INFO")));

        let entry = host.config().entry(OWFS_LOGGING_KEY).await.unwrap();
        assert_eq!(entry.options.len(), 3);
    }

    #[tokio::test]
    async fn test_init_is_idempotent_for_existing_values() {
        let host = Host::new(ConfigStore::new());
        let ext = OwfsConfig::new();

        ext.init(&host).await.unwrap();
        host.config()
            .set(OWFS_PATH_KEY, json!("/custom/1wire"))
            .await
            .unwrap();
        host.config().set(OWFS_LOGGING_KEY, json!("DEBUG")).await.unwrap();

        // Second init must keep the stored values, refreshing metadata only.
        ext.init(&host).await.unwrap();

        assert_eq!(host.config().get(OWFS_PATH_KEY).await, Some(json!("/custom/1wire")));
        assert_eq!(host.config().get(OWFS_LOGGING_KEY).await, Some(json!("DEBUG")));

        let entry = host.config().entry(OWFS_PATH_KEY).await.unwrap();
        assert_eq!(entry.description, "OWFS mount path");
    }

    #[tokio::test]
    async fn test_init_applies_configured_level() {
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = seen.clone();

        let host = Host::new(ConfigStore::new()).with_log_reload(LevelReload::new(move |level| {
            *seen_clone.lock().unwrap() = Some(level);
        }));
        host.config()
            .add(OWFS_LOGGING_KEY, json!("ERROR"), ConfigType::Select, "OWFS logging level", vec![])
            .await
            .unwrap();

        let ext = OwfsConfig::new();
        ext.init(&host).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), Some(Level::ERROR));
    }

    #[tokio::test]
    async fn test_init_fills_shared_slot_when_mount_exists() {
        let dir = tempfile::tempdir().unwrap();
        let host = host_with_mount(dir.path().to_str().unwrap()).await;

        let ext = OwfsConfig::new();
        let handles = ext.handles();
        ext.init(&host).await.unwrap();

        let guard = handles.read().await;
        let pair = guard.as_ref().unwrap();
        assert_eq!(pair.bus.mount(), dir.path());
    }

    #[tokio::test]
    async fn test_construction_failure_is_isolated() {
        let host = host_with_mount("/nonexistent/1wire").await;

        let ext = OwfsConfig::new();
        let handles = ext.handles();

        // Init reports success despite the bad mount; the slot stays empty.
        ext.init(&host).await.unwrap();
        assert!(handles.read().await.is_none());
    }
}
