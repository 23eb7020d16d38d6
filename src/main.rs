//! admission-parity - equivalence test driver.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Creates the Kubernetes client
//! - Runs the scenario catalog through both validation paths
//! - Optionally runs the sequential and burst performance comparisons
//! - Prints the run report and exits non-zero on any discrepancy

use std::time::Duration;

use kube::Client;
use tokio::signal;
use tracing::{info, warn};

use admission_parity::crd::QueueJobSpec;
use admission_parity::perf::PerformanceHarness;
use admission_parity::scenario::{edge_case_scenarios, job_scenarios};
use admission_parity::suite::EquivalenceSuite;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("admission_parity=info".parse()?)
                .add_directive("kube=info".parse()?),
        )
        .json()
        .init();

    info!("Starting admission parity harness");

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let namespace = std::env::var("PARITY_NAMESPACE").unwrap_or_else(|_| {
        warn!("PARITY_NAMESPACE not set, using 'default'");
        "default".to_string()
    });
    let strict_mode = std::env::var("PARITY_STRICT")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(true);

    let suite = EquivalenceSuite::new(client, strict_mode);

    let mut scenarios = job_scenarios().into_all();
    scenarios.extend(edge_case_scenarios());
    info!(
        count = scenarios.len(),
        namespace = %namespace,
        strict_mode,
        "Running scenario catalog"
    );

    let outcome = tokio::select! {
        outcome = suite.run(&namespace, &scenarios) => outcome,
        _ = shutdown_signal() => {
            info!("Received shutdown signal, aborting run");
            return Ok(());
        }
    };

    run_performance_phases(&suite, &namespace).await;

    let report = suite.collector().generate_report();
    println!("{report}");

    info!(
        matched = outcome.matched_count(),
        mismatched = outcome.mismatched_count(),
        errored = outcome.errored_count(),
        expectation_failures = outcome.expectation_failures(),
        "Run complete"
    );

    if !outcome.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}

/// Run the optional performance phases when enabled via environment.
///
/// `PARITY_PERF_ITERATIONS` enables the sequential latency comparison;
/// `PARITY_BURST_RPS` (with optional `PARITY_BURST_SECONDS`, default
/// 30) enables one burst window.
async fn run_performance_phases(suite: &EquivalenceSuite, namespace: &str) {
    let iterations = env_number("PARITY_PERF_ITERATIONS");
    let burst_rps = env_number("PARITY_BURST_RPS");
    if iterations.is_none() && burst_rps.is_none() {
        return;
    }

    let harness = PerformanceHarness::new(
        suite.webhook_validator(),
        suite.policy_validator(),
        namespace,
        performance_spec(),
    );

    if let Some(iterations) = iterations {
        let performance = harness.run_comparison(iterations as usize).await;
        suite
            .collector()
            .record_performance_comparison("queuejobs", performance);
    }

    if let Some(rps) = burst_rps {
        let seconds = env_number("PARITY_BURST_SECONDS").unwrap_or(30);
        let result = harness
            .run_burst_load(rps as u32, Duration::from_secs(seconds))
            .await;
        suite.collector().record_burst_load_comparison(result);
    }
}

/// A well-formed spec both backends accept; performance runs measure
/// the validation paths, not rejection handling.
fn performance_spec() -> QueueJobSpec {
    use admission_parity::crd::{ContainerSpec, PodTemplate, TaskSpec};

    QueueJobSpec {
        min_available: 1,
        tasks: vec![TaskSpec {
            name: "perf-task".to_string(),
            replicas: 1,
            template: PodTemplate {
                containers: vec![ContainerSpec {
                    name: "nginx".to_string(),
                    image: "nginx:1.14".to_string(),
                }],
            },
        }],
        ..Default::default()
    }
}

fn env_number(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the harness cannot
/// shut down gracefully without them. Using expect() here is
/// intentional.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
