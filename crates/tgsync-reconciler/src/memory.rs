//! In-memory collaborators.
//!
//! Backed by a [`Fixture`] snapshot. They record every call they receive and
//! can be told to fail, which makes them the test doubles for the reconciler
//! and the backend of the CLI's dry runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::trace;

use tgsync_core::{
    ClusterId, ServiceId, Target, TargetAddress, TargetGroupHandle, TargetHealthState, Task,
    TaskHandle, TaskStatus,
};

use crate::directory::TaskDirectory;
use crate::error::{DirectoryError, RegistryError};
use crate::registry::TargetRegistry;

/// Snapshot of cluster and load balancer state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Tasks known to the directory, in any status.
    #[serde(default)]
    pub tasks: Vec<Task>,

    /// Targets currently registered in the group.
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl Fixture {
    /// Split the snapshot into a directory and a registry.
    pub fn into_collaborators(self) -> (MemoryDirectory, MemoryRegistry) {
        (
            MemoryDirectory::new(self.tasks),
            MemoryRegistry::new(self.targets),
        )
    }
}

/// A call received by [`MemoryDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
    ListRunning,
    Describe(Vec<TaskHandle>),
}

/// A call received by [`MemoryRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCall {
    Register(Vec<TargetAddress>),
    Deregister(Vec<TargetAddress>),
    DescribeHealth,
}

/// Task directory answering from a fixed task list.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    tasks: Vec<Task>,
    list_failure: Option<String>,
    describe_failure: Option<String>,
    calls: Mutex<Vec<DirectoryCall>>,
}

impl MemoryDirectory {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Default::default()
        }
    }

    /// Make `list_running` fail with a transport error.
    pub fn with_list_failure(mut self, message: impl Into<String>) -> Self {
        self.list_failure = Some(message.into());
        self
    }

    /// Make `describe` fail with a transport error.
    pub fn with_describe_failure(mut self, message: impl Into<String>) -> Self {
        self.describe_failure = Some(message.into());
        self
    }

    /// Calls received so far, oldest first.
    pub async fn calls(&self) -> Vec<DirectoryCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl TaskDirectory for MemoryDirectory {
    async fn list_running(
        &self,
        cluster: &ClusterId,
        service: &ServiceId,
    ) -> Result<Vec<TaskHandle>, DirectoryError> {
        trace!(cluster = %cluster, service = %service, "Listing in-memory tasks");
        self.calls.lock().await.push(DirectoryCall::ListRunning);

        if let Some(message) = &self.list_failure {
            return Err(DirectoryError::Transport(message.clone()));
        }

        Ok(self
            .tasks
            .iter()
            .filter(|task| task.desired_status == TaskStatus::Running)
            .map(|task| task.task_arn.clone())
            .collect())
    }

    async fn describe(
        &self,
        _cluster: &ClusterId,
        tasks: &[TaskHandle],
    ) -> Result<Vec<Task>, DirectoryError> {
        self.calls
            .lock()
            .await
            .push(DirectoryCall::Describe(tasks.to_vec()));

        if let Some(message) = &self.describe_failure {
            return Err(DirectoryError::Transport(message.clone()));
        }

        Ok(tasks
            .iter()
            .filter_map(|handle| self.tasks.iter().find(|task| &task.task_arn == handle))
            .cloned()
            .collect())
    }
}

/// Target registry holding its targets in memory.
///
/// Registering adds missing addresses in the `initial` state; deregistering
/// removes them.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    targets: RwLock<Vec<Target>>,
    mutation_failure: Option<String>,
    health_failure: Option<String>,
    calls: Mutex<Vec<RegistryCall>>,
}

impl MemoryRegistry {
    pub fn new(targets: Vec<Target>) -> Self {
        Self {
            targets: RwLock::new(targets),
            ..Default::default()
        }
    }

    /// Make `register` and `deregister` fail with a rejection.
    pub fn with_mutation_failure(mut self, message: impl Into<String>) -> Self {
        self.mutation_failure = Some(message.into());
        self
    }

    /// Make `describe_health` fail with a transport error.
    pub fn with_health_failure(mut self, message: impl Into<String>) -> Self {
        self.health_failure = Some(message.into());
        self
    }

    /// Current targets.
    pub async fn targets(&self) -> Vec<Target> {
        self.targets.read().await.clone()
    }

    /// Calls received so far, oldest first.
    pub async fn calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().await.clone()
    }

    fn check_mutation(&self) -> Result<(), RegistryError> {
        match &self.mutation_failure {
            Some(message) => Err(RegistryError::Rejected {
                status: 400,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TargetRegistry for MemoryRegistry {
    async fn register(
        &self,
        group: &TargetGroupHandle,
        targets: &[TargetAddress],
    ) -> Result<(), RegistryError> {
        trace!(group = %group, count = targets.len(), "Registering in-memory targets");
        self.calls
            .lock()
            .await
            .push(RegistryCall::Register(targets.to_vec()));
        self.check_mutation()?;

        let mut registered = self.targets.write().await;
        for address in targets {
            if !registered.iter().any(|t| t.address() == address) {
                registered.push(Target::new(address.clone(), TargetHealthState::Initial));
            }
        }
        Ok(())
    }

    async fn deregister(
        &self,
        group: &TargetGroupHandle,
        targets: &[TargetAddress],
    ) -> Result<(), RegistryError> {
        trace!(group = %group, count = targets.len(), "Deregistering in-memory targets");
        self.calls
            .lock()
            .await
            .push(RegistryCall::Deregister(targets.to_vec()));
        self.check_mutation()?;

        self.targets
            .write()
            .await
            .retain(|t| !targets.contains(t.address()));
        Ok(())
    }

    async fn describe_health(
        &self,
        _group: &TargetGroupHandle,
    ) -> Result<Vec<Target>, RegistryError> {
        self.calls.lock().await.push(RegistryCall::DescribeHealth);

        if let Some(message) = &self.health_failure {
            return Err(RegistryError::Transport(message.clone()));
        }
        Ok(self.targets().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_lists_only_desired_running() {
        let directory = MemoryDirectory::new(vec![
            Task::running("t1").with_private_ip("10.0.1.5"),
            Task::running("t2").with_status(TaskStatus::Running, TaskStatus::Stopped),
        ]);

        let handles = directory
            .list_running(&ClusterId::from("prod"), &ServiceId::from("web"))
            .await
            .unwrap();
        assert_eq!(handles, vec![TaskHandle::from("t1")]);
    }

    #[tokio::test]
    async fn test_registry_register_is_idempotent() {
        let registry = MemoryRegistry::new(vec![Target::new("10.0.1.5", TargetHealthState::Healthy)]);
        let group = TargetGroupHandle::from("arn:tg/web");
        let addrs = vec![TargetAddress::from("10.0.1.5"), TargetAddress::from("10.0.2.7")];

        registry.register(&group, &addrs).await.unwrap();
        registry.register(&group, &addrs).await.unwrap();

        let targets = registry.targets().await;
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].target_health.state, TargetHealthState::Healthy);
        assert_eq!(targets[1].target_health.state, TargetHealthState::Initial);
    }

    #[tokio::test]
    async fn test_registry_mutation_failure() {
        let registry = MemoryRegistry::default().with_mutation_failure("ValidationError");
        let err = registry
            .deregister(&TargetGroupHandle::from("arn:tg/web"), &[TargetAddress::from("10.0.1.5")])
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Rejected { status: 400, .. }));
        assert_eq!(registry.calls().await.len(), 1);
    }

    #[test]
    fn test_fixture_parses() {
        let fixture: Fixture = serde_json::from_str(
            r#"{
                "tasks": [{"taskArn": "t1", "lastStatus": "RUNNING", "desiredStatus": "RUNNING"}],
                "targets": [{"target": {"id": "10.0.1.5"}, "targetHealth": {"state": "healthy"}}]
            }"#,
        )
        .unwrap();
        assert_eq!(fixture.tasks.len(), 1);
        assert_eq!(fixture.targets.len(), 1);
    }
}
