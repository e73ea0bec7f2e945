//! Thin handles over an OWFS mount.
//!
//! OWFS exposes 1-Wire devices as files under a mount point. Protocol
//! framing, device discovery, and bus arbitration all live behind the
//! mount in the owserver process; these handles only validate the mount
//! path and tie the bus/server pair together for the sensors that hold
//! them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised while opening an OWFS mount.
#[derive(Debug, Error)]
pub enum OwfsError {
    /// Mount path does not exist
    #[error("OWFS mount not found: {0}")]
    MountNotFound(PathBuf),

    /// Mount path exists but is not a directory
    #[error("OWFS mount is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connection to a 1-Wire bus exposed through an OWFS mount.
#[derive(Debug, Clone)]
pub struct Bus {
    mount: PathBuf,
}

impl Bus {
    /// Open a bus at the given mount path.
    pub fn open(mount: impl AsRef<Path>) -> Result<Self, OwfsError> {
        let mount = mount.as_ref().to_path_buf();
        if !mount.exists() {
            return Err(OwfsError::MountNotFound(mount));
        }
        if !mount.is_dir() {
            return Err(OwfsError::NotADirectory(mount));
        }
        Ok(Self { mount })
    }

    /// Get the mount path.
    pub fn mount(&self) -> &Path {
        &self.mount
    }
}

/// Coordinating server for a bus.
#[derive(Debug, Clone)]
pub struct Server {
    bus: Bus,
}

impl Server {
    /// Start a server coordinating the given bus.
    pub fn start(bus: &Bus) -> Result<Self, OwfsError> {
        Ok(Self { bus: bus.clone() })
    }

    /// Get the coordinated bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }
}

/// The bus/server pair constructed once at startup.
#[derive(Debug, Clone)]
pub struct OwfsHandles {
    /// Physical bus connection
    pub bus: Bus,
    /// Coordinating server
    pub server: Server,
}

impl OwfsHandles {
    /// Open a bus at the mount path and start its server.
    pub fn open(mount: impl AsRef<Path>) -> Result<Self, OwfsError> {
        let bus = Bus::open(mount)?;
        let server = Server::start(&bus)?;
        Ok(Self { bus, server })
    }
}

/// Slot holding the handle pair, shared between the configuration
/// extension that fills it and every sensor instance that holds it.
/// Stays `None` when construction fails.
pub type SharedHandles = Arc<RwLock<Option<OwfsHandles>>>;

/// Create an empty shared slot.
pub fn shared_handles() -> SharedHandles {
    Arc::new(RwLock::new(None))
}
