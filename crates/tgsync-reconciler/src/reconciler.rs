//! Membership reconciler - keeps a target group aligned with running tasks.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, info_span, warn, Instrument};

use tgsync_core::{
    extract_addresses, InvocationId, LifecycleEvent, TargetAddress, TaskStatus,
};

use crate::config::{EmptyServicePolicy, ReconcilerConfig};
use crate::directory::TaskDirectory;
use crate::error::{FailureKind, ReconcileError};
use crate::outcome::{InvocationResponse, Outcome};
use crate::registry::TargetRegistry;

/// Aligns a target group with the addresses of a service's running tasks.
///
/// Holds no state between invocations: every call re-reads the directory
/// and, for STOPPED events, the registry.
#[derive(Clone)]
pub struct Reconciler {
    config: ReconcilerConfig,
    directory: Arc<dyn TaskDirectory>,
    registry: Arc<dyn TargetRegistry>,
}

impl Reconciler {
    /// Create a new Reconciler.
    pub fn new(
        config: ReconcilerConfig,
        directory: Arc<dyn TaskDirectory>,
        registry: Arc<dyn TargetRegistry>,
    ) -> Self {
        Self {
            config,
            directory,
            registry,
        }
    }

    /// Configuration this reconciler was built with.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Entry point for the trigger platform.
    ///
    /// Never fails: every error is folded into the response message.
    pub async fn invoke(&self, payload: &Value) -> InvocationResponse {
        self.handle(payload).await.into()
    }

    /// Parse the payload and reconcile.
    pub async fn handle(&self, payload: &Value) -> Result<Outcome, ReconcileError> {
        let event = LifecycleEvent::from_value(payload).map_err(|e| {
            error!(error = %e, "Rejected event payload");
            ReconcileError::from(e)
        })?;
        self.reconcile(&event).await
    }

    /// Reconcile the target group for one lifecycle event.
    pub async fn reconcile(&self, event: &LifecycleEvent) -> Result<Outcome, ReconcileError> {
        let invocation = InvocationId::generate();
        let span = info_span!(
            "reconcile",
            invocation = %invocation,
            status = %event.status,
            target_group = %self.config.target_group,
        );

        async {
            debug!(
                task = ?event.task_arn.as_ref().map(|t| t.as_str()),
                time = ?event.time,
                "Received lifecycle event"
            );

            let result = match &event.status {
                TaskStatus::Running => self.register_running().await,
                TaskStatus::Stopped => self.deregister_stale().await,
                TaskStatus::Other(status) => {
                    debug!(status = %status, "Ignoring task status");
                    Ok(Outcome::Ignored {
                        status: event.status.clone(),
                    })
                }
            };

            match &result {
                Ok(outcome) => debug!(outcome = outcome.label(), "Reconciliation finished"),
                Err(e) if e.kind() == FailureKind::EmptyResult => error!("{}", e),
                Err(e) => error!(error = %e, "Reconciliation failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// RUNNING: register every running address.
    ///
    /// Already registered addresses are submitted again; the registry treats
    /// that as a no-op.
    async fn register_running(&self) -> Result<Outcome, ReconcileError> {
        let targets: Vec<TargetAddress> = self.running_addresses().await?.into_iter().collect();
        let group = &self.config.target_group;

        self.registry.register(group, &targets).await?;
        info!(targets = %join(&targets), "Registered targets");

        Ok(Outcome::Registered {
            target_group: group.clone(),
            targets,
        })
    }

    /// STOPPED: deregister every registered address no running task claims.
    async fn deregister_stale(&self) -> Result<Outcome, ReconcileError> {
        let running = match self.running_addresses().await {
            Ok(addresses) => addresses,
            Err(ReconcileError::NoRunningTasks)
                if self.config.empty_service_policy == EmptyServicePolicy::DrainAll =>
            {
                warn!("Service has no running tasks, draining target group");
                BTreeSet::new()
            }
            Err(e) => return Err(e),
        };
        let group = &self.config.target_group;

        let registered = self.registry.describe_health(group).await?;
        let stale: Vec<TargetAddress> = registered
            .iter()
            .map(|target| target.address())
            .filter(|address| !running.contains(*address))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        debug!(
            registered = registered.len(),
            running = running.len(),
            stale = stale.len(),
            "Computed stale targets"
        );

        if stale.is_empty() {
            info!("No stale targets to deregister");
            return Ok(Outcome::Unchanged {
                target_group: group.clone(),
            });
        }

        self.registry.deregister(group, &stale).await?;
        info!(targets = %join(&stale), "Deregistered targets");

        Ok(Outcome::Deregistered {
            target_group: group.clone(),
            targets: stale,
        })
    }

    /// Addresses of the service's running tasks, fetched fresh.
    async fn running_addresses(&self) -> Result<BTreeSet<TargetAddress>, ReconcileError> {
        let ReconcilerConfig {
            cluster, service, ..
        } = &self.config;

        let handles = self.directory.list_running(cluster, service).await?;
        if handles.is_empty() {
            return Err(ReconcileError::NoRunningTasks);
        }

        let tasks = self.directory.describe(cluster, &handles).await?;
        let addresses = extract_addresses(&tasks);
        debug!(
            tasks = tasks.len(),
            addresses = addresses.len(),
            "Resolved running task addresses"
        );

        if addresses.is_empty() {
            return Err(ReconcileError::NoAddressesFound);
        }
        Ok(addresses)
    }
}

fn join(addresses: &[TargetAddress]) -> String {
    addresses
        .iter()
        .map(TargetAddress::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
