//! Plugin registry: named extension and sensor factories.
//!
//! Plugins register their extension instances and sensor factories at
//! load time; the host looks both up by name when it initializes and
//! when it constructs sensor instances.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{PluginError, PluginResult};
use crate::extension::Extension;
use crate::sensor::Sensor;

/// Factory constructing a fresh sensor instance.
pub type SensorFactory = Arc<dyn Fn() -> Arc<dyn Sensor> + Send + Sync>;

/// Registry for extensions and sensor factories.
pub struct PluginRegistry {
    extensions: RwLock<HashMap<String, Arc<dyn Extension>>>,
    sensors: RwLock<HashMap<String, SensorFactory>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            extensions: RwLock::new(HashMap::new()),
            sensors: RwLock::new(HashMap::new()),
        }
    }

    /// Register an extension under a name.
    pub async fn register_extension(
        &self,
        name: &str,
        extension: Arc<dyn Extension>,
    ) -> PluginResult<()> {
        let mut extensions = self.extensions.write().await;
        if extensions.contains_key(name) {
            return Err(PluginError::AlreadyRegistered(name.to_string()));
        }
        extensions.insert(name.to_string(), extension);
        Ok(())
    }

    /// Register a sensor factory under a name.
    pub async fn register_sensor(&self, name: &str, factory: SensorFactory) -> PluginResult<()> {
        let mut sensors = self.sensors.write().await;
        if sensors.contains_key(name) {
            return Err(PluginError::AlreadyRegistered(name.to_string()));
        }
        sensors.insert(name.to_string(), factory);
        Ok(())
    }

    /// Get an extension by name.
    pub async fn extension(&self, name: &str) -> Option<Arc<dyn Extension>> {
        self.extensions.read().await.get(name).cloned()
    }

    /// List all registered extensions.
    pub async fn extensions(&self) -> Vec<(String, Arc<dyn Extension>)> {
        self.extensions
            .read()
            .await
            .iter()
            .map(|(name, ext)| (name.clone(), ext.clone()))
            .collect()
    }

    /// Construct a sensor instance from a registered factory.
    pub async fn create_sensor(&self, name: &str) -> PluginResult<Arc<dyn Sensor>> {
        let sensors = self.sensors.read().await;
        let factory = sensors
            .get(name)
            .ok_or_else(|| PluginError::SensorNotFound(name.to_string()))?;
        Ok(factory())
    }

    /// List registered sensor names.
    pub async fn sensor_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sensors.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered extensions.
    pub async fn extension_count(&self) -> usize {
        self.extensions.read().await.len()
    }

    /// Check whether a sensor name is registered.
    pub async fn contains_sensor(&self, name: &str) -> bool {
        self.sensors.read().await.contains_key(name)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
