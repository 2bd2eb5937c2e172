//! Error types for fete_app

use std::path::PathBuf;

use fete_platform::PlatformError;
use thiserror::Error;

/// Errors that can occur in the Fete application
#[derive(Error, Debug)]
pub enum FeteError {
    /// Failed to read a configuration file
    #[error("Failed to read {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a configuration file
    #[error("Failed to parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Failed to serialize a configuration
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// A configuration value is out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Platform error (display link, etc.)
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Result type for fete_app operations
pub type Result<T> = std::result::Result<T, FeteError>;
