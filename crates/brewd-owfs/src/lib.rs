//! OWFS 1-Wire temperature plugin for the brewd host.
//!
//! Registers two components with the host:
//! - `OwfsConfig`: ensures the mount-path and logging-level entries
//!   exist, applies the verbosity, and constructs the bus/server pair
//! - `OwfsTemps`: a temperature sensor polling once per second and
//!   reporting through the push-update bus

use std::sync::Arc;

use brewd_plugin_sdk::{Host, PluginDescriptor, PluginResult, Sensor};

pub mod config;
pub mod owfs;
pub mod sensor;

pub use config::{DEFAULT_MOUNT, OWFS_LOGGING_KEY, OWFS_PATH_KEY, OwfsConfig};
pub use owfs::{Bus, OwfsError, OwfsHandles, Server, SharedHandles, shared_handles};
pub use sensor::OwfsTempSensor;

/// Plugin name used for host discovery.
pub const PLUGIN_NAME: &str = "brewd-owfs";
/// Plugin version.
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Packaging metadata for host discovery.
pub fn descriptor() -> PluginDescriptor {
    PluginDescriptor::new(PLUGIN_NAME, PLUGIN_VERSION)
        .with_description("1-Wire temperature sensing over an OWFS mount")
        .with_author("brewd Contributors")
}

/// Register the plugin's extension and sensor with the host.
///
/// The sensor factory captures the configuration extension's shared
/// bus/server slot, so every instance constructed later sees handles
/// filled during initialization. The slot is also returned for direct
/// inspection.
pub async fn register(host: &Host) -> PluginResult<SharedHandles> {
    let extension = OwfsConfig::new();
    let handles = extension.handles();

    host.registry()
        .register_extension("OwfsConfig", Arc::new(extension))
        .await?;

    let factory_handles = handles.clone();
    host.registry()
        .register_sensor(
            "OwfsTemps",
            Arc::new(move || {
                Arc::new(OwfsTempSensor::new(factory_handles.clone())) as Arc<dyn Sensor>
            }),
        )
        .await?;

    Ok(handles)
}
