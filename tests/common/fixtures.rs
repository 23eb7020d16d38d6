//! Test fixtures and builder patterns for QueueJob.

use admission_parity::crd::{ContainerSpec, PodTemplate, QueueJob, QueueJobSpec, TaskSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Builder for creating QueueJob test fixtures.
///
/// # Example
/// ```
/// let job = QueueJobBuilder::new("test-job")
///     .namespace("test-ns")
///     .min_available(2)
///     .task("worker", 3)
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct QueueJobBuilder {
    name: String,
    namespace: Option<String>,
    min_available: i32,
    max_retry: i32,
    queue: String,
    tasks: Vec<TaskSpec>,
}

impl QueueJobBuilder {
    /// Create a new builder with the given job name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            min_available: 1,
            max_retry: 3,
            queue: "default".to_string(),
            tasks: Vec::new(),
        }
    }

    /// Set the namespace for the job.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the minimum available pod count.
    pub fn min_available(mut self, min_available: i32) -> Self {
        self.min_available = min_available;
        self
    }

    /// Set the maximum retry count.
    pub fn max_retry(mut self, max_retry: i32) -> Self {
        self.max_retry = max_retry;
        self
    }

    /// Set the target queue.
    pub fn queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }

    /// Append a task with an nginx pod template.
    pub fn task(mut self, name: impl Into<String>, replicas: i32) -> Self {
        self.tasks.push(TaskSpec {
            name: name.into(),
            replicas,
            template: PodTemplate {
                containers: vec![ContainerSpec {
                    name: "nginx".to_string(),
                    image: "nginx:1.14".to_string(),
                }],
            },
        });
        self
    }

    /// Build only the spec.
    pub fn build_spec(&self) -> QueueJobSpec {
        QueueJobSpec {
            min_available: self.min_available,
            max_retry: self.max_retry,
            queue: self.queue.clone(),
            tasks: self.tasks.clone(),
        }
    }

    /// Build the full QueueJob resource.
    pub fn build(&self) -> QueueJob {
        let mut job = QueueJob::new(&self.name, self.build_spec());
        job.metadata = ObjectMeta {
            name: Some(self.name.clone()),
            namespace: self.namespace.clone(),
            ..Default::default()
        };
        job
    }
}
