//! Sensor capability interface and the push-update bus.
//!
//! Sensors are driven by the host: a context carries the running flag
//! and the push-update channel, and the sensor's `run` entry point polls
//! until the flag clears. State queries are synchronous and side-effect
//! free.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::{PluginError, PluginResult};

/// Default capacity of the push-update channel.
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// A value published by a sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorUpdate {
    /// Id of the publishing sensor instance
    pub sensor_id: String,
    /// Published value
    pub value: Value,
    /// When the value was published
    pub timestamp: DateTime<Utc>,
}

/// Push-update channel shared by all sensor instances.
///
/// Built on a broadcast channel: every subscriber sees every update, and
/// a slow subscriber drops the oldest buffered updates rather than
/// blocking publishers.
#[derive(Clone)]
pub struct SensorBus {
    tx: broadcast::Sender<SensorUpdate>,
}

impl SensorBus {
    /// Create a bus with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    /// Create a bus with the given buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an update to all subscribers.
    ///
    /// Returns `true` if there was at least one subscriber.
    pub fn publish(&self, update: SensorUpdate) -> bool {
        self.tx.send(update).is_ok()
    }

    /// Subscribe to all sensor updates.
    pub fn subscribe(&self) -> broadcast::Receiver<SensorUpdate> {
        self.tx.subscribe()
    }

    /// Get the number of current subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SensorBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Runtime context handed to a sensor instance by the host.
///
/// Holds the instance id, its properties mapping, the host-controlled
/// running flag, and the push-update channel. Cloning the context shares
/// the flag, so the host keeps a clone to stop the polling loop.
#[derive(Clone)]
pub struct SensorContext {
    id: String,
    props: HashMap<String, String>,
    running: Arc<AtomicBool>,
    bus: SensorBus,
}

impl SensorContext {
    /// Create a context with the running flag set.
    pub fn new(id: impl Into<String>, props: HashMap<String, String>, bus: SensorBus) -> Self {
        Self {
            id: id.into(),
            props,
            running: Arc::new(AtomicBool::new(true)),
            bus,
        }
    }

    /// Get the sensor instance id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the instance properties.
    pub fn props(&self) -> &HashMap<String, String> {
        &self.props
    }

    /// Check the host-controlled running flag.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Clear the running flag. The polling loop observes the change on
    /// its next iteration, at most one polling interval later.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Publish a freshly measured value.
    ///
    /// Returns `true` if there was at least one subscriber.
    pub fn push_update(&self, value: Value) -> bool {
        self.bus.publish(SensorUpdate {
            sensor_id: self.id.clone(),
            value,
            timestamp: Utc::now(),
        })
    }
}

/// Sensor capability trait.
#[async_trait]
pub trait Sensor: Send + Sync {
    /// Polling entry point. Runs until the context's running flag
    /// clears; not restartable afterwards.
    async fn run(&self, ctx: &SensorContext);

    /// Synchronous state snapshot with no side effects.
    fn state(&self) -> Value;

    /// Invoke a named action. Unknown actions are rejected.
    async fn action(&self, name: &str, _args: &Value) -> PluginResult<Value> {
        Err(PluginError::UnsupportedAction {
            action: name.to_string(),
        })
    }
}

impl std::fmt::Debug for dyn Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sensor").finish_non_exhaustive()
    }
}
