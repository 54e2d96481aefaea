//! Reconciliation outcomes and the response record returned to the trigger.

use serde::{Deserialize, Serialize};

use tgsync_core::{TargetAddress, TargetGroupHandle, TaskStatus};

use crate::error::{FailureKind, ReconcileError};

/// Result of a completed reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Running addresses were submitted for registration.
    Registered {
        target_group: TargetGroupHandle,
        targets: Vec<TargetAddress>,
    },

    /// Stale addresses were deregistered.
    Deregistered {
        target_group: TargetGroupHandle,
        targets: Vec<TargetAddress>,
    },

    /// Registered targets already matched the running tasks.
    Unchanged { target_group: TargetGroupHandle },

    /// The event status does not drive reconciliation.
    Ignored { status: TaskStatus },
}

impl Outcome {
    /// Human readable summary.
    pub fn message(&self) -> String {
        match self {
            Self::Registered { .. } => "Successfully registered targets.".to_string(),
            Self::Deregistered { .. } => "Successfully deregistered targets.".to_string(),
            Self::Unchanged { .. } => "No stale targets to deregister.".to_string(),
            Self::Ignored { status } => format!("Ignored task status '{}'.", status),
        }
    }

    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "registered",
            Self::Deregistered { .. } => "deregistered",
            Self::Unchanged { .. } => "unchanged",
            Self::Ignored { .. } => "ignored",
        }
    }
}

/// Record handed back to the invoking trigger.
///
/// Failures are reported through `message` only; the invocation itself
/// always completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_targets: Option<Vec<TargetAddress>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deregistered_targets: Option<Vec<TargetAddress>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_group_arn: Option<TargetGroupHandle>,
}

impl From<Outcome> for InvocationResponse {
    fn from(outcome: Outcome) -> Self {
        let message = outcome.message();
        match outcome {
            Outcome::Registered {
                target_group,
                targets,
            } => Self {
                message,
                registered_targets: Some(targets),
                target_group_arn: Some(target_group),
                ..Default::default()
            },
            Outcome::Deregistered {
                target_group,
                targets,
            } => Self {
                message,
                deregistered_targets: Some(targets),
                target_group_arn: Some(target_group),
                ..Default::default()
            },
            Outcome::Unchanged { target_group } => Self {
                message,
                deregistered_targets: Some(Vec::new()),
                target_group_arn: Some(target_group),
                ..Default::default()
            },
            Outcome::Ignored { .. } => Self {
                message,
                ..Default::default()
            },
        }
    }
}

impl From<&ReconcileError> for InvocationResponse {
    fn from(err: &ReconcileError) -> Self {
        let message = match err.kind() {
            FailureKind::EmptyResult => err.to_string(),
            FailureKind::Fault => format!("Error: {}", err),
        };
        Self {
            message,
            ..Default::default()
        }
    }
}

impl From<Result<Outcome, ReconcileError>> for InvocationResponse {
    fn from(result: Result<Outcome, ReconcileError>) -> Self {
        match result {
            Ok(outcome) => outcome.into(),
            Err(err) => (&err).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DirectoryError;

    #[test]
    fn test_registered_response_shape() {
        let response = InvocationResponse::from(Outcome::Registered {
            target_group: TargetGroupHandle::from("arn:tg/web"),
            targets: vec![TargetAddress::from("10.0.1.5")],
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "Successfully registered targets.",
                "registered_targets": ["10.0.1.5"],
                "target_group_arn": "arn:tg/web"
            })
        );
    }

    #[test]
    fn test_unchanged_reports_empty_deregistration() {
        let response = InvocationResponse::from(Outcome::Unchanged {
            target_group: TargetGroupHandle::from("arn:tg/web"),
        });
        assert_eq!(response.deregistered_targets, Some(Vec::new()));
        assert!(response.registered_targets.is_none());
    }

    #[test]
    fn test_failure_responses_carry_only_a_message() {
        let empty = InvocationResponse::from(&ReconcileError::NoRunningTasks);
        assert_eq!(empty.message, "No running tasks found for the service.");
        assert!(empty.target_group_arn.is_none());

        let fault = InvocationResponse::from(&ReconcileError::from(DirectoryError::Transport(
            "connection reset".to_string(),
        )));
        assert!(fault.message.starts_with("Error: "));
        assert!(fault.message.contains("connection reset"));
    }

    #[test]
    fn test_ignored_message_names_status() {
        let response = InvocationResponse::from(Outcome::Ignored {
            status: TaskStatus::from("PENDING"),
        });
        assert_eq!(response.message, "Ignored task status 'PENDING'.");
    }
}
