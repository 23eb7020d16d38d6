//! Named validation scenarios driving the equivalence pipeline.
//!
//! Each scenario pairs an input QueueJob spec with the outcome both
//! backends are expected to produce. Scenarios are static fixtures:
//! defined before a run, read-only, never mutated by the engine.

use crate::crd::{ContainerSpec, PodTemplate, QueueJobSpec, TaskSpec};
use crate::validator::Operation;

/// Outcome a scenario expects from both backends.
#[derive(Debug, Clone)]
pub struct ExpectedValidation {
    /// Whether the object should be admitted.
    pub allowed: bool,
    /// Substring both rejection messages must contain; only meaningful
    /// when `allowed` is false.
    pub error_contains: Option<String>,
}

impl ExpectedValidation {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            error_contains: None,
        }
    }

    pub fn denied(error_contains: impl Into<String>) -> Self {
        Self {
            allowed: false,
            error_contains: Some(error_contains.into()),
        }
    }
}

/// A named validation fixture.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub spec: QueueJobSpec,
    pub operation: Operation,
    pub expected: ExpectedValidation,
}

impl TestScenario {
    fn create(name: &str, spec: QueueJobSpec, expected: ExpectedValidation) -> Self {
        Self {
            name: name.to_string(),
            spec,
            operation: Operation::Create,
            expected,
        }
    }
}

/// Job scenarios grouped by the validation category they exercise.
#[derive(Debug, Clone, Default)]
pub struct JobScenarios {
    pub basic_field: Vec<TestScenario>,
    pub cross_field: Vec<TestScenario>,
    pub task_structure: Vec<TestScenario>,
}

impl JobScenarios {
    /// Flatten all categories, preserving catalog order.
    pub fn into_all(self) -> Vec<TestScenario> {
        let mut all = self.basic_field;
        all.extend(self.cross_field);
        all.extend(self.task_structure);
        all
    }
}

/// The standard job scenario catalog.
pub fn job_scenarios() -> JobScenarios {
    JobScenarios {
        basic_field: vec![
            TestScenario::create(
                "valid_basic_job",
                QueueJobSpec {
                    min_available: 1,
                    tasks: vec![task("task1", 2)],
                    ..Default::default()
                },
                ExpectedValidation::allowed(),
            ),
            TestScenario::create(
                "invalid_min_available_negative",
                QueueJobSpec {
                    min_available: -1,
                    tasks: vec![task("task1", 1)],
                    ..Default::default()
                },
                ExpectedValidation::denied("'minAvailable' must be >= 0"),
            ),
            TestScenario::create(
                "invalid_max_retry_negative",
                QueueJobSpec {
                    min_available: 1,
                    max_retry: -1,
                    tasks: vec![task("task1", 1)],
                    ..Default::default()
                },
                ExpectedValidation::denied("'maxRetry' cannot be less than zero"),
            ),
        ],
        cross_field: vec![TestScenario::create(
            "min_available_exceeds_total_replicas",
            QueueJobSpec {
                min_available: 5,
                tasks: vec![task("task1", 2)],
                ..Default::default()
            },
            ExpectedValidation::denied("'minAvailable' should not be greater than total replicas"),
        )],
        task_structure: vec![
            TestScenario::create(
                "no_tasks_defined",
                QueueJobSpec {
                    min_available: 1,
                    tasks: Vec::new(),
                    ..Default::default()
                },
                ExpectedValidation::denied("No task specified in job spec"),
            ),
            TestScenario::create(
                "duplicate_task_names",
                QueueJobSpec {
                    min_available: 1,
                    tasks: vec![task("task1", 1), task("task1", 1)],
                    ..Default::default()
                },
                ExpectedValidation::denied("duplicated task name"),
            ),
        ],
    }
}

/// Edge-case scenarios exercising configuration extremes.
pub fn edge_case_scenarios() -> Vec<TestScenario> {
    vec![TestScenario::create(
        "maximum_task_count",
        QueueJobSpec {
            min_available: 50,
            tasks: generate_tasks(50),
            ..Default::default()
        },
        ExpectedValidation::allowed(),
    )]
}

fn task(name: &str, replicas: i32) -> TaskSpec {
    TaskSpec {
        name: name.to_string(),
        replicas,
        template: PodTemplate {
            containers: vec![ContainerSpec {
                name: "nginx".to_string(),
                image: "nginx:1.14".to_string(),
            }],
        },
    }
}

fn generate_tasks(count: usize) -> Vec<TaskSpec> {
    (0..count).map(|i| task(&format!("task-{i}"), 1)).collect()
}
