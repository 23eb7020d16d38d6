//! Cluster-backed parity tests.
//!
//! Each test dry-runs QueueJobs against a real apiserver through both
//! adapters. What the backends enforce depends on what the cluster
//! fixture has deployed; these tests only assert harness behavior that
//! holds either way.

use std::sync::Arc;
use std::time::Duration;

use kube::api::{Api, ListParams};
use kube::Client;

use admission_parity::crd::QueueJob;
use admission_parity::perf::PerformanceHarness;
use admission_parity::suite::EquivalenceSuite;
use admission_parity::validator::{Operation, PolicyValidator, Validator, WebhookValidator};

use crate::common::fixtures::QueueJobBuilder;
use crate::ensure_crd_installed;
use crate::namespace::TestNamespace;

#[tokio::test(flavor = "multi_thread")]
#[ignore]
async fn test_dry_run_create_persists_nothing() {
    let client = Client::try_default().await.expect("kubeconfig required");
    ensure_crd_installed(client.clone()).await;
    let namespace = TestNamespace::create(client.clone(), "parity-dry-run").await;

    let validator = WebhookValidator::new(client.clone());
    let spec = QueueJobBuilder::new("dry-run-job").task("task1", 1).build_spec();

    let result = validator
        .validate(namespace.name(), &spec, Operation::Create)
        .await
        .expect("dry-run call should complete");
    assert!(result.latency > Duration::ZERO);

    // The hard requirement: dry-run must not leak objects.
    let jobs: Api<QueueJob> = Api::namespaced(client, namespace.name());
    let listed = jobs
        .list(&ListParams::default())
        .await
        .expect("list should succeed");
    assert!(listed.items.is_empty());

    namespace.delete().await;
}

#[tokio::test(flavor = "multi_thread")]
#[ignore]
async fn test_both_adapters_complete_the_same_request() {
    let client = Client::try_default().await.expect("kubeconfig required");
    ensure_crd_installed(client.clone()).await;
    let namespace = TestNamespace::create(client.clone(), "parity-pair").await;

    let webhook = WebhookValidator::new(client.clone());
    let policy = PolicyValidator::new(client.clone());
    let spec = QueueJobBuilder::new("pair-job").task("task1", 2).build_spec();

    let webhook_result = webhook
        .validate(namespace.name(), &spec, Operation::Create)
        .await
        .expect("webhook-path call should complete");
    let policy_result = policy
        .validate(namespace.name(), &spec, Operation::Create)
        .await
        .expect("policy-path call should complete");

    // Without any enforcement deployed both paths admit; with
    // enforcement deployed both should deny. Either way the decisions
    // must agree for a well-formed spec.
    assert_eq!(webhook_result.allowed, policy_result.allowed);

    namespace.delete().await;
}

#[tokio::test(flavor = "multi_thread")]
#[ignore]
async fn test_suite_runs_catalog_against_cluster() {
    let client = Client::try_default().await.expect("kubeconfig required");
    ensure_crd_installed(client.clone()).await;
    let namespace = TestNamespace::create(client.clone(), "parity-suite").await;

    let suite = EquivalenceSuite::new(client, true);
    let scenarios = admission_parity::scenario::job_scenarios().into_all();
    let outcome = suite.run(namespace.name(), &scenarios).await;

    assert_eq!(outcome.verdicts.len(), scenarios.len());
    assert_eq!(outcome.errored_count(), 0);

    let report = suite.collector().generate_report();
    assert!(report.contains("Total Test Scenarios"));

    namespace.delete().await;
}

#[tokio::test(flavor = "multi_thread")]
#[ignore]
async fn test_burst_load_smoke() {
    let client = Client::try_default().await.expect("kubeconfig required");
    ensure_crd_installed(client.clone()).await;
    let namespace = TestNamespace::create(client.clone(), "parity-burst").await;

    let harness = PerformanceHarness::new(
        Arc::new(WebhookValidator::new(client.clone())),
        Arc::new(PolicyValidator::new(client)),
        namespace.name(),
        QueueJobBuilder::new("burst-job").task("task1", 1).build_spec(),
    );

    let result = harness.run_burst_load(10, Duration::from_secs(2)).await;

    assert!(result.request_count > 0);
    assert!((0.0..=1.0).contains(&result.webhook_error_rate));
    assert!((0.0..=1.0).contains(&result.policy_error_rate));

    namespace.delete().await;
}
