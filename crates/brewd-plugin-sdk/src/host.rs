//! Host handle: the services the host exposes to plugins, and the
//! sensor lifecycle it drives.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{Level, debug, error, info};

use crate::config::ConfigStore;
use crate::error::PluginResult;
use crate::registry::PluginRegistry;
use crate::sensor::{Sensor, SensorBus, SensorContext};

/// Applies a log level chosen at runtime to the active subscriber.
///
/// The host runner wraps its reloadable filter in one of these; in
/// embedded or test setups no handle is installed and level changes are
/// dropped.
#[derive(Clone)]
pub struct LevelReload(Arc<dyn Fn(Level) + Send + Sync>);

impl LevelReload {
    /// Create a reload handle from a callback.
    pub fn new(apply: impl Fn(Level) + Send + Sync + 'static) -> Self {
        Self(Arc::new(apply))
    }

    /// Apply a new log level.
    pub fn apply(&self, level: Level) {
        (self.0)(level)
    }
}

impl fmt::Debug for LevelReload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LevelReload")
    }
}

/// Handle to host services, passed to extensions at initialization and
/// used by the runner to drive sensor instances.
#[derive(Clone)]
pub struct Host {
    config: Arc<ConfigStore>,
    sensor_bus: SensorBus,
    registry: Arc<PluginRegistry>,
    log_reload: Option<LevelReload>,
}

impl Host {
    /// Create a host around a configuration store.
    pub fn new(config: ConfigStore) -> Self {
        Self {
            config: Arc::new(config),
            sensor_bus: SensorBus::new(),
            registry: Arc::new(PluginRegistry::new()),
            log_reload: None,
        }
    }

    /// Install a log level reload handle.
    pub fn with_log_reload(mut self, reload: LevelReload) -> Self {
        self.log_reload = Some(reload);
        self
    }

    /// Get the configuration store.
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Get the push-update bus.
    pub fn sensor_bus(&self) -> &SensorBus {
        &self.sensor_bus
    }

    /// Get the plugin registry.
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Apply a log level through the installed reload handle, if any.
    pub fn set_log_level(&self, level: Level) {
        match &self.log_reload {
            Some(reload) => reload.apply(level),
            None => debug!("no log reload handle installed, keeping current level"),
        }
    }

    /// Initialize every registered extension, awaiting each in turn.
    ///
    /// Runs before any sensor instance is constructed so extensions can
    /// publish shared state that sensors depend on. A failing extension
    /// is logged and skipped; it never takes the host down.
    pub async fn init_extensions(&self) -> PluginResult<()> {
        for (name, extension) in self.registry.extensions().await {
            info!(extension = %name, "initializing extension");
            if let Err(e) = extension.init(self).await {
                error!(extension = %name, "extension initialization failed: {e}");
            }
        }
        Ok(())
    }

    /// Construct a registered sensor and spawn its polling loop.
    pub async fn spawn_sensor(
        &self,
        name: &str,
        id: &str,
        props: HashMap<String, String>,
    ) -> PluginResult<SensorHandle> {
        let sensor = self.registry.create_sensor(name).await?;
        let ctx = SensorContext::new(id, props, self.sensor_bus.clone());

        let task_sensor = sensor.clone();
        let task_ctx = ctx.clone();
        let task = tokio::spawn(async move {
            task_sensor.run(&task_ctx).await;
        });

        debug!(sensor = %name, id = %id, "sensor started");
        Ok(SensorHandle { sensor, ctx, task })
    }
}

/// Handle to a running sensor instance.
pub struct SensorHandle {
    sensor: Arc<dyn Sensor>,
    ctx: SensorContext,
    task: tokio::task::JoinHandle<()>,
}

impl fmt::Debug for SensorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorHandle")
            .field("id", &self.ctx.id())
            .finish_non_exhaustive()
    }
}

impl SensorHandle {
    /// Get the sensor's context.
    pub fn context(&self) -> &SensorContext {
        &self.ctx
    }

    /// Query the sensor's current state.
    pub fn state(&self) -> Value {
        self.sensor.state()
    }

    /// Invoke a named action on the sensor.
    pub async fn action(&self, name: &str, args: &Value) -> PluginResult<Value> {
        self.sensor.action(name, args).await
    }

    /// Check whether the polling loop is still allowed to run.
    pub fn is_running(&self) -> bool {
        self.ctx.is_running()
    }

    /// Clear the running flag. The loop exits within one polling
    /// interval.
    pub fn stop(&self) {
        self.ctx.stop();
    }

    /// Wait for the polling loop to exit.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}
