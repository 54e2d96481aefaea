//! Target address extraction from task records.

use std::collections::BTreeSet;

use crate::task::PRIVATE_IPV4_DETAIL;
use crate::{Task, TargetAddress};

/// Collect the private addresses of the given tasks.
///
/// Only network interface attachments are considered, and within them only
/// the `privateIPv4Address` detail. Tasks without one contribute nothing.
/// Duplicate addresses collapse.
pub fn extract_addresses<'a, I>(tasks: I) -> BTreeSet<TargetAddress>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .flat_map(|task| task.attachments.iter())
        .filter(|attachment| attachment.is_network_interface())
        .flat_map(|attachment| attachment.details.iter())
        .filter(|detail| detail.name == PRIVATE_IPV4_DETAIL)
        .map(|detail| TargetAddress::new(detail.value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Attachment, AttachmentDetail};

    fn addrs(values: &[&str]) -> BTreeSet<TargetAddress> {
        values.iter().map(|v| TargetAddress::from(*v)).collect()
    }

    #[test]
    fn test_extracts_one_address_per_task() {
        let tasks = vec![
            Task::running("t1").with_private_ip("10.0.1.5"),
            Task::running("t2").with_private_ip("10.0.2.7"),
        ];
        assert_eq!(extract_addresses(&tasks), addrs(&["10.0.1.5", "10.0.2.7"]));
    }

    #[test]
    fn test_order_does_not_matter_and_duplicates_collapse() {
        let forward = vec![
            Task::running("t1").with_private_ip("10.0.1.5"),
            Task::running("t2").with_private_ip("10.0.2.7"),
            Task::running("t3").with_private_ip("10.0.1.5"),
        ];
        let reversed: Vec<Task> = forward.iter().rev().cloned().collect();

        assert_eq!(extract_addresses(&forward), extract_addresses(&reversed));
        assert_eq!(extract_addresses(&forward).len(), 2);
    }

    #[test]
    fn test_ignores_other_attachment_types_and_details() {
        let gateway = Attachment {
            kind: "ServiceConnect".to_string(),
            details: vec![AttachmentDetail::new(PRIVATE_IPV4_DETAIL, "192.168.0.1")],
        };
        let eni_without_ip = Attachment {
            kind: crate::task::ENI_ATTACHMENT_TYPE.to_string(),
            details: vec![
                AttachmentDetail::new("subnetId", "subnet-1"),
                AttachmentDetail::new("macAddress", "0a:1b"),
            ],
        };
        let tasks = vec![
            Task::running("t1").with_attachment(gateway),
            Task::running("t2").with_attachment(eni_without_ip),
            Task::running("t3"),
        ];

        assert!(extract_addresses(&tasks).is_empty());
    }

    #[test]
    fn test_task_with_multiple_interfaces_contributes_all() {
        let tasks = vec![Task::running("t1")
            .with_private_ip("10.0.1.5")
            .with_private_ip("10.0.3.9")];
        assert_eq!(extract_addresses(&tasks), addrs(&["10.0.1.5", "10.0.3.9"]));
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_addresses(&Vec::<Task>::new()).is_empty());
    }
}
