//! Reconciler configuration.

use std::fmt;
use std::str::FromStr;

use tgsync_core::{ClusterId, CoreError, ServiceId, TargetGroupHandle};

/// Environment variable naming the cluster.
pub const CLUSTER_ENV: &str = "ECS_CLUSTER_NAME";
/// Environment variable naming the service.
pub const SERVICE_ENV: &str = "ECS_SERVICE_NAME";
/// Environment variable naming the target group.
pub const TARGET_GROUP_ENV: &str = "TARGET_GROUP_ARN";
/// Environment variable selecting the [`EmptyServicePolicy`].
pub const EMPTY_SERVICE_POLICY_ENV: &str = "EMPTY_SERVICE_POLICY";

/// What a STOPPED event does when the service has no running tasks left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyServicePolicy {
    /// Report "no running tasks" and leave the target group untouched.
    #[default]
    Abort,
    /// Deregister every target in the group.
    DrainAll,
}

impl FromStr for EmptyServicePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "drain-all" | "drain_all" => Ok(Self::DrainAll),
            other => Err(CoreError::InvalidConfig(format!(
                "unknown empty service policy '{}' (expected 'abort' or 'drain-all')",
                other
            ))),
        }
    }
}

impl fmt::Display for EmptyServicePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => f.write_str("abort"),
            Self::DrainAll => f.write_str("drain-all"),
        }
    }
}

/// Reconciler configuration, validated once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Cluster the service runs in.
    pub cluster: ClusterId,

    /// Service whose tasks back the target group.
    pub service: ServiceId,

    /// Target group kept in sync.
    pub target_group: TargetGroupHandle,

    /// Behavior when a STOPPED event finds no running tasks.
    pub empty_service_policy: EmptyServicePolicy,
}

impl ReconcilerConfig {
    /// Create a configuration, rejecting blank identifiers.
    pub fn new(
        cluster: impl Into<ClusterId>,
        service: impl Into<ServiceId>,
        target_group: impl Into<TargetGroupHandle>,
    ) -> Result<Self, CoreError> {
        let config = Self {
            cluster: cluster.into(),
            service: service.into(),
            target_group: target_group.into(),
            empty_service_policy: EmptyServicePolicy::default(),
        };

        if config.cluster.is_blank() {
            return Err(CoreError::InvalidConfig("cluster must not be empty".to_string()));
        }
        if config.service.is_blank() {
            return Err(CoreError::InvalidConfig("service must not be empty".to_string()));
        }
        if config.target_group.is_blank() {
            return Err(CoreError::InvalidConfig(
                "target group must not be empty".to_string(),
            ));
        }

        Ok(config)
    }

    /// Builder method to set the empty service policy.
    pub fn with_empty_service_policy(mut self, policy: EmptyServicePolicy) -> Self {
        self.empty_service_policy = policy;
        self
    }

    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key).ok_or_else(|| CoreError::InvalidConfig(format!("{} is not set", key)))
        };

        let config = Self::new(
            require(CLUSTER_ENV)?,
            require(SERVICE_ENV)?,
            require(TARGET_GROUP_ENV)?,
        )?;

        match lookup(EMPTY_SERVICE_POLICY_ENV) {
            Some(policy) => Ok(config.with_empty_service_policy(policy.parse()?)),
            None => Ok(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_new_rejects_blank_values() {
        assert!(ReconcilerConfig::new("prod", "web", "tg").is_ok());
        assert!(matches!(
            ReconcilerConfig::new("", "web", "tg"),
            Err(CoreError::InvalidConfig(_))
        ));
        assert!(ReconcilerConfig::new("prod", " ", "tg").is_err());
        assert!(ReconcilerConfig::new("prod", "web", "").is_err());
    }

    #[test]
    fn test_from_env() {
        let config = ReconcilerConfig::from_lookup(env(&[
            (CLUSTER_ENV, "prod"),
            (SERVICE_ENV, "web"),
            (TARGET_GROUP_ENV, "arn:tg/web"),
        ]))
        .unwrap();

        assert_eq!(config.cluster.as_str(), "prod");
        assert_eq!(config.service.as_str(), "web");
        assert_eq!(config.target_group.as_str(), "arn:tg/web");
        assert_eq!(config.empty_service_policy, EmptyServicePolicy::Abort);
    }

    #[test]
    fn test_from_env_missing_variable() {
        let err = ReconcilerConfig::from_lookup(env(&[(CLUSTER_ENV, "prod")])).unwrap_err();
        assert!(err.to_string().contains(SERVICE_ENV));
    }

    #[test]
    fn test_from_env_policy() {
        let config = ReconcilerConfig::from_lookup(env(&[
            (CLUSTER_ENV, "prod"),
            (SERVICE_ENV, "web"),
            (TARGET_GROUP_ENV, "arn:tg/web"),
            (EMPTY_SERVICE_POLICY_ENV, "DRAIN-ALL"),
        ]))
        .unwrap();
        assert_eq!(config.empty_service_policy, EmptyServicePolicy::DrainAll);

        assert!("sometimes".parse::<EmptyServicePolicy>().is_err());
    }
}
