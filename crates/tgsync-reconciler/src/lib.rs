//! tgsync Reconciler Library
//!
//! Keeps a load balancer target group in sync with the running tasks of a
//! cluster service. Each lifecycle event triggers one stateless
//! reconciliation against a [`TaskDirectory`] and a [`TargetRegistry`].

pub mod client;
pub mod config;
pub mod directory;
pub mod error;
pub mod http;
pub mod memory;
pub mod metrics;
pub mod outcome;
pub mod reconciler;
pub mod registry;
pub mod state;

pub use client::{HttpClient, HttpTargetRegistry, HttpTaskDirectory};
pub use config::{EmptyServicePolicy, ReconcilerConfig};
pub use directory::TaskDirectory;
pub use error::{DirectoryError, FailureKind, ReconcileError, RegistryError};
pub use memory::{Fixture, MemoryDirectory, MemoryRegistry};
pub use metrics::Metrics;
pub use outcome::{InvocationResponse, Outcome};
pub use reconciler::Reconciler;
pub use registry::TargetRegistry;
pub use state::AppState;
