//! OWFS temperature sensor.
//!
//! Polls once per second, publishing a counter that wraps at 100. The
//! bus/server handles are held for the upcoming real device read path
//! but are not consulted yet; the counter stands in for a measurement.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info};

use brewd_plugin_sdk::{PluginError, PluginResult, Sensor, SensorContext};

use crate::owfs::SharedHandles;

/// Polling interval of the temperature loop.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Temperature sensor backed by an OWFS bus.
pub struct OwfsTempSensor {
    value: AtomicU8,
    /// Bus/server slot shared with the configuration extension. Unread
    /// until real device polling lands; kept so a late-filled slot is
    /// visible to existing instances.
    #[allow(dead_code)]
    handles: SharedHandles,
}

impl OwfsTempSensor {
    /// Create a sensor holding the shared bus/server slot.
    pub fn new(handles: SharedHandles) -> Self {
        Self {
            value: AtomicU8::new(0),
            handles,
        }
    }

    /// Get the last published value.
    pub fn value(&self) -> u8 {
        self.value.load(Ordering::Relaxed)
    }

    /// Advance the counter one step, wrapping at 100.
    fn advance(&self) -> u8 {
        let next = (self.value.load(Ordering::Relaxed) + 1) % 100;
        self.value.store(next, Ordering::Relaxed);
        next
    }
}

#[async_trait]
impl Sensor for OwfsTempSensor {
    async fn run(&self, ctx: &SensorContext) {
        while ctx.is_running() {
            let value = self.advance();
            ctx.push_update(json!(value));
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        debug!(sensor = ctx.id(), "polling loop stopped");
    }

    fn state(&self) -> Value {
        json!({ "value": self.value() })
    }

    async fn action(&self, name: &str, args: &Value) -> PluginResult<Value> {
        match name {
            // Diagnostic action: log the arguments, change nothing.
            "test" => {
                info!(?args, "test action invoked");
                Ok(args.clone())
            }
            _ => Err(PluginError::UnsupportedAction {
                action: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::owfs::shared_handles;
    use brewd_plugin_sdk::SensorBus;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn test_counter_wraps_at_100() {
        let sensor = OwfsTempSensor::new(shared_handles());

        for _ in 0..99 {
            sensor.advance();
        }
        assert_eq!(sensor.value(), 99);

        assert_eq!(sensor.advance(), 0);

        // 150 steps from zero land on 150 mod 100.
        let sensor = OwfsTempSensor::new(shared_handles());
        for _ in 0..150 {
            sensor.advance();
        }
        assert_eq!(sensor.value(), 50);
    }

    #[test]
    fn test_state_is_exactly_the_last_value() {
        let sensor = OwfsTempSensor::new(shared_handles());
        assert_eq!(sensor.state(), json!({ "value": 0 }));

        sensor.advance();
        sensor.advance();
        assert_eq!(sensor.state(), json!({ "value": 2 }));
    }

    #[tokio::test]
    async fn test_test_action_echoes_args() {
        let sensor = OwfsTempSensor::new(shared_handles());
        let args = json!({ "probe": "28.FF4C" });

        let result = sensor.action("test", &args).await.unwrap();
        assert_eq!(result, args);
        assert_eq!(sensor.state(), json!({ "value": 0 }));
    }

    #[tokio::test]
    async fn test_unknown_action_rejected() {
        let sensor = OwfsTempSensor::new(shared_handles());
        let err = sensor.action("calibrate", &json!({})).await.unwrap_err();
        assert!(matches!(err, PluginError::UnsupportedAction { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_publishes_and_stops_within_one_interval() {
        let bus = SensorBus::new();
        let mut rx = bus.subscribe();
        let ctx = SensorContext::new("owfs-1", HashMap::new(), bus);

        let sensor = Arc::new(OwfsTempSensor::new(shared_handles()));
        let task_sensor = sensor.clone();
        let task_ctx = ctx.clone();
        let task = tokio::spawn(async move {
            task_sensor.run(&task_ctx).await;
        });

        assert_eq!(rx.recv().await.unwrap().value, json!(1));
        assert_eq!(rx.recv().await.unwrap().value, json!(2));

        // Clearing the flag while the loop sleeps: it must exit at the
        // next wakeup without publishing again.
        ctx.stop();
        task.await.unwrap();

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(sensor.state(), json!({ "value": 2 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sensor_runs_with_empty_handles() {
        // Bus construction failed upstream: the slot is None and the
        // sensor must still initialize and poll.
        let bus = SensorBus::new();
        let mut rx = bus.subscribe();
        let ctx = SensorContext::new("owfs-1", HashMap::new(), bus);

        let sensor = Arc::new(OwfsTempSensor::new(shared_handles()));
        let task_sensor = sensor.clone();
        let task_ctx = ctx.clone();
        let task = tokio::spawn(async move {
            task_sensor.run(&task_ctx).await;
        });

        assert_eq!(rx.recv().await.unwrap().value, json!(1));
        ctx.stop();
        task.await.unwrap();
    }
}
