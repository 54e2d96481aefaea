//! Load balancer targets.

use crate::TargetAddress;
use serde::{Deserialize, Serialize};

/// A registered target and its health as reported by the registry.
///
/// Health is informational only; membership decisions look at the address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub target: TargetDescription,

    #[serde(default)]
    pub target_health: TargetHealth,
}

impl Target {
    /// Create a target with the given health state.
    pub fn new(address: impl Into<TargetAddress>, state: TargetHealthState) -> Self {
        Self {
            target: TargetDescription { id: address.into() },
            target_health: TargetHealth { state },
        }
    }

    /// Address the target is registered under.
    pub fn address(&self) -> &TargetAddress {
        &self.target.id
    }
}

/// Identity of a target within its group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescription {
    pub id: TargetAddress,
}

/// Health block of a registered target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHealth {
    #[serde(default)]
    pub state: TargetHealthState,
}

/// Health state of a registered target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetHealthState {
    Initial,
    Healthy,
    Unhealthy,
    Unused,
    Draining,
    Unavailable,
    #[default]
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_deserializes_registry_shape() {
        let json = r#"{"target": {"id": "10.0.1.5", "port": 80}, "targetHealth": {"state": "draining"}}"#;
        let target: Target = serde_json::from_str(json).unwrap();
        assert_eq!(target.address().as_str(), "10.0.1.5");
        assert_eq!(target.target_health.state, TargetHealthState::Draining);
    }

    #[test]
    fn test_unrecognized_health_state_is_unknown() {
        let json = r#"{"target": {"id": "10.0.1.5"}, "targetHealth": {"state": "unhealthy.draining"}}"#;
        let target: Target = serde_json::from_str(json).unwrap();
        assert_eq!(target.target_health.state, TargetHealthState::Unknown);
    }
}
