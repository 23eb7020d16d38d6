//! QueueJob Custom Resource Definition.
//!
//! A minimal batch workload resource that both validation backends
//! (webhook and ValidatingAdmissionPolicy) enforce rules against. The
//! harness only constructs these objects and submits them with
//! server-side dry-run; it never reads the backends' rule sets.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// QueueJob is a batch workload scheduled against a named queue.
///
/// Example:
/// ```yaml
/// apiVersion: batch.parity.dev/v1alpha1
/// kind: QueueJob
/// metadata:
///   name: my-job
/// spec:
///   minAvailable: 1
///   queue: default
///   tasks:
///     - name: worker
///       replicas: 2
/// ```
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "batch.parity.dev",
    version = "v1alpha1",
    kind = "QueueJob",
    plural = "queuejobs",
    shortname = "qj",
    status = "QueueJobStatus",
    namespaced,
    printcolumn = r#"{"name":"Queue", "type":"string", "jsonPath":".spec.queue"}"#,
    printcolumn = r#"{"name":"MinAvailable", "type":"integer", "jsonPath":".spec.minAvailable"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct QueueJobSpec {
    /// Minimum number of pods that must be available for the job to be
    /// considered running (default 1).
    #[serde(default = "default_min_available")]
    pub min_available: i32,

    /// Maximum number of retries before the job is marked failed
    /// (default 3).
    #[serde(default = "default_max_retry")]
    pub max_retry: i32,

    /// Name of the queue the job is submitted to (default "default").
    #[serde(default = "default_queue")]
    pub queue: String,

    /// Task groups that make up the job.
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

impl Default for QueueJobSpec {
    fn default() -> Self {
        Self {
            min_available: default_min_available(),
            max_retry: default_max_retry(),
            queue: default_queue(),
            tasks: Vec::new(),
        }
    }
}

impl QueueJobSpec {
    /// Sum of replicas across all tasks.
    pub fn total_replicas(&self) -> i32 {
        self.tasks.iter().map(|t| t.replicas).sum()
    }
}

/// A group of identical pods within a QueueJob.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    /// Task name, unique within the job.
    pub name: String,

    /// Number of pod replicas for this task (default 1).
    #[serde(default = "default_replicas")]
    pub replicas: i32,

    /// Pod template for the task's replicas.
    #[serde(default)]
    pub template: PodTemplate,
}

/// Minimal pod template carried by a task.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplate {
    /// Containers to run in each replica.
    #[serde(default)]
    pub containers: Vec<ContainerSpec>,
}

/// Container within a task's pod template.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    /// Container name.
    pub name: String,
    /// Container image reference.
    pub image: String,
}

/// Status subresource for QueueJob.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueJobStatus {
    /// Current lifecycle phase as reported by the scheduler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Number of currently running pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running: Option<i32>,
}

fn default_min_available() -> i32 {
    1
}

fn default_max_retry() -> i32 {
    3
}

fn default_queue() -> String {
    "default".to_string()
}

fn default_replicas() -> i32 {
    1
}
