//! Extension capability interface.

use async_trait::async_trait;

use crate::descriptor::PluginDescriptor;
use crate::error::PluginResult;
use crate::host::Host;

/// A component initialized once when the host starts.
///
/// The host awaits `init` for every registered extension before any
/// sensor instance is constructed, so a sensor can rely on whatever
/// shared state its extension set up during initialization.
#[async_trait]
pub trait Extension: Send + Sync {
    /// Get the extension's metadata.
    fn descriptor(&self) -> &PluginDescriptor;

    /// Initialization entry point, awaited by the host at startup.
    async fn init(&self, host: &Host) -> PluginResult<()>;
}
