//! Newtype wrappers for handles and addresses.
//!
//! Every handle here is opaque: the reconciler passes them through to the
//! collaborators untouched and never parses their contents.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new value from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the inner string reference.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Returns true if the value is empty or whitespace.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_id!(
    /// Opaque handle of a task in the cluster (task ARN).
    TaskHandle
);

string_id!(
    /// Cluster the service runs in.
    ClusterId
);

string_id!(
    /// Service whose running tasks back the target group.
    ServiceId
);

string_id!(
    /// Opaque handle of a load balancer target group (target group ARN).
    TargetGroupHandle
);

string_id!(
    /// Network address of a target, as reported by the task's attachment.
    TargetAddress
);

/// Identifier attached to one reconciler invocation for log correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(String);

impl InvocationId {
    /// Generate a new random InvocationId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_display_and_blank() {
        let group = TargetGroupHandle::new("arn:aws:elasticloadbalancing:tg/web/abc");
        assert_eq!(group.to_string(), "arn:aws:elasticloadbalancing:tg/web/abc");
        assert!(!group.is_blank());
        assert!(ClusterId::from("  ").is_blank());
    }

    #[test]
    fn test_address_serializes_transparently() {
        let addr = TargetAddress::from("10.0.1.5");
        assert_eq!(serde_json::to_string(&addr).unwrap(), "\"10.0.1.5\"");
    }

    #[test]
    fn test_addresses_order_lexically() {
        let mut addrs = vec![TargetAddress::from("10.0.0.9"), TargetAddress::from("10.0.0.10")];
        addrs.sort();
        assert_eq!(addrs[0].as_str(), "10.0.0.10");
    }

    #[test]
    fn test_invocation_ids_are_unique() {
        assert_ne!(InvocationId::generate(), InvocationId::generate());
    }
}
