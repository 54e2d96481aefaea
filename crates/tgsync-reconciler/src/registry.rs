//! Target registry collaborator.

use async_trait::async_trait;

use tgsync_core::{Target, TargetAddress, TargetGroupHandle};

use crate::error::RegistryError;

/// Load balancer target registry.
///
/// Registering an address that is already registered must succeed.
#[async_trait]
pub trait TargetRegistry: Send + Sync {
    /// Register addresses as targets of the group.
    async fn register(
        &self,
        group: &TargetGroupHandle,
        targets: &[TargetAddress],
    ) -> Result<(), RegistryError>;

    /// Deregister addresses from the group.
    async fn deregister(
        &self,
        group: &TargetGroupHandle,
        targets: &[TargetAddress],
    ) -> Result<(), RegistryError>;

    /// Describe every registered target, whatever its health state.
    async fn describe_health(&self, group: &TargetGroupHandle)
        -> Result<Vec<Target>, RegistryError>;
}
