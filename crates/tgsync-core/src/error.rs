//! Core domain errors.

use thiserror::Error;

/// Core domain errors for tgsync.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Event payload could not be interpreted.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Configuration value missing or malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
