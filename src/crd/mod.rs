//! Custom resource definitions targeted by the parity harness.

mod queue_job;

pub use queue_job::{
    ContainerSpec, PodTemplate, QueueJob, QueueJobSpec, QueueJobStatus, TaskSpec,
};

/// API group of the QueueJob resource.
pub const GROUP: &str = "batch.parity.dev";
/// API version of the QueueJob resource.
pub const VERSION: &str = "v1alpha1";
/// Kind of the QueueJob resource.
pub const KIND: &str = "QueueJob";
/// Plural resource name of the QueueJob resource.
pub const PLURAL: &str = "queuejobs";
