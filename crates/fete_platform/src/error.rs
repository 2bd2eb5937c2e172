//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Refresh rate was zero, negative or not a number
    #[error("Invalid refresh rate: {0} Hz")]
    InvalidRefreshRate(f64),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
