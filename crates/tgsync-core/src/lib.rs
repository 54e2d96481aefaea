//! tgsync Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Async runtime
//!
//! Tasks, attachments, targets and lifecycle events are modeled here along
//! with the address extraction that turns running tasks into target
//! addresses.

pub mod error;
pub mod event;
pub mod extract;
pub mod ids;
pub mod status;
pub mod target;
pub mod task;

// Re-export commonly used types
pub use error::CoreError;
pub use event::LifecycleEvent;
pub use extract::extract_addresses;
pub use ids::{ClusterId, InvocationId, ServiceId, TargetAddress, TargetGroupHandle, TaskHandle};
pub use status::TaskStatus;
pub use target::{Target, TargetHealthState};
pub use task::{Attachment, AttachmentDetail, Task};
