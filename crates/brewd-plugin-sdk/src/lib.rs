//! brewd Plugin SDK
//!
//! This SDK is the surface brewd plugins compile against. It provides:
//! - A configuration store with typed entries and choice-list metadata
//! - The `Extension` trait for components initialized once at startup
//! - The `Sensor` trait, sensor context, and push-update bus
//! - A registry for named extension and sensor factories
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use brewd_plugin_sdk::prelude::*;
//!
//! # async fn example() -> PluginResult<()> {
//! let host = Host::new(ConfigStore::new());
//! host.init_extensions().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod extension;
pub mod host;
pub mod registry;
pub mod sensor;

pub use config::{ConfigEntry, ConfigOption, ConfigStore, ConfigType};
pub use descriptor::PluginDescriptor;
pub use error::{PluginError, PluginResult};
pub use extension::Extension;
pub use host::{Host, LevelReload, SensorHandle};
pub use registry::{PluginRegistry, SensorFactory};
pub use sensor::{Sensor, SensorBus, SensorContext, SensorUpdate};

/// Prelude module with common imports.
pub mod prelude {
    pub use crate::config::{ConfigEntry, ConfigOption, ConfigStore, ConfigType};
    pub use crate::descriptor::PluginDescriptor;
    pub use crate::error::{PluginError, PluginResult};
    pub use crate::extension::Extension;
    pub use crate::host::{Host, LevelReload, SensorHandle};
    pub use crate::registry::PluginRegistry;
    pub use crate::sensor::{Sensor, SensorBus, SensorContext, SensorUpdate};
    pub use serde_json::Value;
}
