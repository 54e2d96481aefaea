//! Task lifecycle events that trigger reconciliation.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::{CoreError, TaskHandle, TaskStatus};

/// A task state change delivered by the trigger platform.
///
/// Only `status` selects the reconciliation branch. The remaining fields are
/// carried for logging; membership is always recomputed from the directory.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleEvent {
    /// Status the task transitioned to.
    pub status: TaskStatus,

    /// Task that changed state, when the payload names it.
    pub task_arn: Option<TaskHandle>,

    /// Deployment group of the task (`service:<name>`), when present.
    pub group: Option<String>,

    /// When the platform emitted the event.
    pub time: Option<DateTime<Utc>>,
}

impl LifecycleEvent {
    /// Create an event carrying only a status.
    pub fn new(status: TaskStatus) -> Self {
        Self {
            status,
            task_arn: None,
            group: None,
            time: None,
        }
    }

    /// Parse an event from a JSON payload.
    ///
    /// Accepts the event-bus envelope (`{"detail": {"lastStatus": ..}}`) and
    /// the flat form (`{"taskStatus": ..}`).
    pub fn from_value(payload: &Value) -> Result<Self, CoreError> {
        let wire = EventWire::deserialize(payload).map_err(|_| {
            CoreError::InvalidEvent(
                "expected `detail.lastStatus` or `taskStatus` in payload".to_string(),
            )
        })?;
        Ok(wire.into())
    }

    /// Parse an event from a JSON string.
    pub fn from_json(payload: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| CoreError::InvalidEvent(e.to_string()))?;
        Self::from_value(&value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EventWire {
    Envelope {
        detail: DetailWire,
        #[serde(default)]
        time: Option<Value>,
    },
    Flat {
        #[serde(rename = "taskStatus")]
        task_status: TaskStatus,
        #[serde(rename = "taskArn", default)]
        task_arn: Option<TaskHandle>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailWire {
    last_status: TaskStatus,
    #[serde(default)]
    task_arn: Option<TaskHandle>,
    #[serde(default)]
    group: Option<String>,
}

impl From<EventWire> for LifecycleEvent {
    fn from(wire: EventWire) -> Self {
        match wire {
            EventWire::Envelope { detail, time } => Self {
                status: detail.last_status,
                task_arn: detail.task_arn,
                group: detail.group,
                time: time
                    .as_ref()
                    .and_then(Value::as_str)
                    .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                    .map(|t| t.with_timezone(&Utc)),
            },
            EventWire::Flat {
                task_status,
                task_arn,
            } => Self {
                status: task_status,
                task_arn,
                group: None,
                time: None,
            },
        }
    }
}
