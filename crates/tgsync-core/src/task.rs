//! Task and network attachment records as reported by the task directory.

use crate::{TaskHandle, TaskStatus};
use serde::{Deserialize, Serialize};

/// Attachment type carrying a task's network interface.
pub const ENI_ATTACHMENT_TYPE: &str = "ElasticNetworkInterface";

/// Attachment detail holding the task's private address.
pub const PRIVATE_IPV4_DETAIL: &str = "privateIPv4Address";

/// A task running (or recently running) in the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque task handle.
    pub task_arn: TaskHandle,

    /// Status last reported by the orchestrator.
    pub last_status: TaskStatus,

    /// Status the orchestrator is driving the task towards.
    pub desired_status: TaskStatus,

    /// Network and other attachments.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Task {
    /// Create a running task with no attachments.
    pub fn running(task_arn: impl Into<TaskHandle>) -> Self {
        Self {
            task_arn: task_arn.into(),
            last_status: TaskStatus::Running,
            desired_status: TaskStatus::Running,
            attachments: Vec::new(),
        }
    }

    /// Builder method to add a network interface carrying `address`.
    pub fn with_private_ip(mut self, address: impl Into<String>) -> Self {
        self.attachments.push(Attachment::network_interface(address));
        self
    }

    /// Builder method to add an arbitrary attachment.
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Builder method to set both statuses.
    pub fn with_status(mut self, last: TaskStatus, desired: TaskStatus) -> Self {
        self.last_status = last;
        self.desired_status = desired;
        self
    }
}

/// A typed attachment with key/value details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment type, e.g. `ElasticNetworkInterface`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Key/value details.
    #[serde(default)]
    pub details: Vec<AttachmentDetail>,
}

impl Attachment {
    /// Create a network interface attachment carrying a private address.
    pub fn network_interface(address: impl Into<String>) -> Self {
        Self {
            kind: ENI_ATTACHMENT_TYPE.to_string(),
            details: vec![AttachmentDetail::new(PRIVATE_IPV4_DETAIL, address)],
        }
    }

    /// Returns true if this attachment is a network interface.
    pub fn is_network_interface(&self) -> bool {
        self.kind == ENI_ATTACHMENT_TYPE
    }
}

/// One key/value entry of an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDetail {
    pub name: String,
    pub value: String,
}

impl AttachmentDetail {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_deserializes_orchestrator_shape() {
        let json = r#"{
            "taskArn": "arn:aws:ecs:task/web/1",
            "lastStatus": "RUNNING",
            "desiredStatus": "RUNNING",
            "attachments": [{
                "type": "ElasticNetworkInterface",
                "details": [
                    {"name": "subnetId", "value": "subnet-1"},
                    {"name": "privateIPv4Address", "value": "10.0.1.5"}
                ]
            }]
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.task_arn.as_str(), "arn:aws:ecs:task/web/1");
        assert!(task.last_status.is_running());
        assert!(task.attachments[0].is_network_interface());
        assert_eq!(task.attachments[0].details.len(), 2);
    }

    #[test]
    fn test_missing_attachments_default_to_empty() {
        let json = r#"{"taskArn": "t1", "lastStatus": "PENDING", "desiredStatus": "RUNNING"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.attachments.is_empty());
        assert_eq!(task.last_status, TaskStatus::Other("PENDING".to_string()));
    }
}
