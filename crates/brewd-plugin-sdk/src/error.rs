//! Plugin error types.

use thiserror::Error;

/// Errors surfaced through the plugin SDK.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Extension not registered under the given name
    #[error("Extension not found: {0}")]
    ExtensionNotFound(String),

    /// Sensor not registered under the given name
    #[error("Sensor not found: {0}")]
    SensorNotFound(String),

    /// A component is already registered under the given name
    #[error("Already registered: {0}")]
    AlreadyRegistered(String),

    /// Sensor action not supported
    #[error("Unsupported action: {action}")]
    UnsupportedAction { action: String },

    /// Configuration store failure
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<String> for PluginError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

impl From<&str> for PluginError {
    fn from(msg: &str) -> Self {
        Self::Other(msg.to_string())
    }
}

/// Result type used throughout the SDK.
pub type PluginResult<T> = Result<T, PluginError>;
