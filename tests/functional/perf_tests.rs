//! Performance harness tests against mock validators.

use std::sync::Arc;
use std::time::Duration;

use admission_parity::perf::PerformanceHarness;

use crate::common::fixtures::QueueJobBuilder;
use crate::mock_validator::{MockBehavior, MockValidator};

fn harness(webhook: MockValidator, policy: MockValidator) -> PerformanceHarness {
    PerformanceHarness::new(
        Arc::new(webhook),
        Arc::new(policy),
        "default",
        QueueJobBuilder::new("perf-job").task("task1", 1).build_spec(),
    )
}

#[tokio::test]
async fn test_run_comparison_collects_one_sample_per_iteration() {
    let harness = harness(
        MockValidator::new("webhook", MockBehavior::Allow),
        MockValidator::new("policy", MockBehavior::Allow),
    );

    let performance = harness.run_comparison(5).await;

    assert_eq!(performance.total_requests, 5);
    assert_eq!(performance.webhook_latency.len(), 5);
    assert_eq!(performance.policy_latency.len(), 5);
    assert_eq!(performance.webhook_errors, 0);
    assert_eq!(performance.policy_errors, 0);
}

#[tokio::test]
async fn test_run_comparison_counts_errors_without_samples() {
    let harness = harness(
        MockValidator::new("webhook", MockBehavior::Allow),
        MockValidator::new("policy", MockBehavior::Fail),
    );

    let performance = harness.run_comparison(4).await;

    assert_eq!(performance.webhook_latency.len(), 4);
    assert_eq!(performance.policy_errors, 4);
    // Errored calls contribute no latency sample.
    assert!(performance.policy_latency.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_burst_load_issues_pairs_and_bounds_rates() {
    let harness = harness(
        MockValidator::new("webhook", MockBehavior::Allow),
        MockValidator::new("policy", MockBehavior::Allow),
    );

    let result = harness
        .run_burst_load(50, Duration::from_millis(200))
        .await;

    assert!(result.request_count > 0);
    assert!((0.0..=1.0).contains(&result.webhook_error_rate));
    assert!((0.0..=1.0).contains(&result.policy_error_rate));
    assert_eq!(result.webhook_error_rate, 0.0);
    assert_eq!(result.policy_error_rate, 0.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_burst_load_counts_backend_errors_independently() {
    let harness = harness(
        MockValidator::new("webhook", MockBehavior::Allow),
        MockValidator::new("policy", MockBehavior::Fail),
    );

    let result = harness
        .run_burst_load(50, Duration::from_millis(200))
        .await;

    assert!(result.request_count > 0);
    assert_eq!(result.webhook_error_rate, 0.0);
    // Every policy call failed.
    assert!((result.policy_error_rate - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_burst_load_zero_duration_issues_nothing() {
    let harness = harness(
        MockValidator::new("webhook", MockBehavior::Allow),
        MockValidator::new("policy", MockBehavior::Allow),
    );

    let result = harness.run_burst_load(10, Duration::ZERO).await;

    assert_eq!(result.request_count, 0);
    assert_eq!(result.webhook_error_rate, 0.0);
    assert_eq!(result.policy_error_rate, 0.0);
}

#[tokio::test]
async fn test_burst_load_zero_rate_issues_nothing() {
    let harness = harness(
        MockValidator::new("webhook", MockBehavior::Allow),
        MockValidator::new("policy", MockBehavior::Allow),
    );

    let result = harness.run_burst_load(0, Duration::from_millis(50)).await;

    assert_eq!(result.request_count, 0);
}
