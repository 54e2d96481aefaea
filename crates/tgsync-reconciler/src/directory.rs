//! Task directory collaborator.

use async_trait::async_trait;

use tgsync_core::{ClusterId, ServiceId, Task, TaskHandle};

use crate::error::DirectoryError;

/// Read access to the cluster orchestrator.
///
/// Implementations answer from authoritative state at call time; the
/// reconciler never caches their answers across invocations.
#[async_trait]
pub trait TaskDirectory: Send + Sync {
    /// List handles of tasks whose desired status is `RUNNING` for a service.
    async fn list_running(
        &self,
        cluster: &ClusterId,
        service: &ServiceId,
    ) -> Result<Vec<TaskHandle>, DirectoryError>;

    /// Describe tasks, including their network attachments.
    async fn describe(
        &self,
        cluster: &ClusterId,
        tasks: &[TaskHandle],
    ) -> Result<Vec<Task>, DirectoryError>;
}
