//! Reconciler and collaborator errors.

use thiserror::Error;

use tgsync_core::CoreError;

/// Errors raised by a task directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Request never completed (connection, timeout, ...).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The directory answered with a failure status.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Errors raised by a target registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Request never completed (connection, timeout, ...).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The registry answered with a failure status.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Why an invocation did not complete a membership change.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("No running tasks found for the service.")]
    NoRunningTasks,

    #[error("No private IP addresses found for the tasks.")]
    NoAddressesFound,

    #[error(transparent)]
    InvalidEvent(#[from] CoreError),

    #[error("task directory {0}")]
    Directory(#[from] DirectoryError),

    #[error("target registry {0}")]
    Registry(#[from] RegistryError),
}

/// Failure category of a [`ReconcileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Authoritative state was empty; nothing was changed.
    EmptyResult,
    /// A collaborator or the payload failed.
    Fault,
}

impl ReconcileError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoRunningTasks | Self::NoAddressesFound => FailureKind::EmptyResult,
            Self::InvalidEvent(_) | Self::Directory(_) | Self::Registry(_) => FailureKind::Fault,
        }
    }
}
