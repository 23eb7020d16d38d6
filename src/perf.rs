//! Performance harness for the two validation paths.
//!
//! Generates repeated or concurrent dry-run calls against both
//! backends and summarizes timing and error behavior. Counters are
//! shared behind a single mutex held only for the increment; adapter
//! I/O always happens outside the lock.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use jiff::Timestamp;
use tracing::{debug, info, warn};

use crate::crd::QueueJobSpec;
use crate::stats::LatencyStats;
use crate::validator::{Operation, Validator};

/// Summary of one sequential latency comparison run.
#[derive(Debug, Default)]
pub struct ValidationPerformance {
    pub webhook_latency: LatencyStats,
    pub policy_latency: LatencyStats,
    /// Calls to the webhook path that failed before completing.
    pub webhook_errors: usize,
    /// Calls to the policy path that failed before completing.
    pub policy_errors: usize,
    /// Iterations issued per backend.
    pub total_requests: usize,
}

/// Summary of one burst load window.
#[derive(Debug, Clone)]
pub struct BurstLoadResult {
    /// Configured window length.
    pub duration: Duration,
    /// Tick-pairs issued during the window; each pair is one webhook
    /// call plus one policy call.
    pub request_count: usize,
    /// Fraction of webhook calls that failed, in [0, 1].
    pub webhook_error_rate: f64,
    /// Fraction of policy calls that failed, in [0, 1].
    pub policy_error_rate: f64,
    /// When the window completed.
    pub timestamp: Timestamp,
}

#[derive(Default)]
struct BurstCounters {
    total_requests: usize,
    webhook_errors: usize,
    policy_errors: usize,
}

/// Drives load against both validation paths.
pub struct PerformanceHarness {
    webhook: Arc<dyn Validator>,
    policy: Arc<dyn Validator>,
    namespace: String,
    spec: Arc<QueueJobSpec>,
}

impl PerformanceHarness {
    /// The harness issues every call with the given fixed spec so a
    /// latency regression can be attributed to the backend, not the
    /// input.
    pub fn new(
        webhook: Arc<dyn Validator>,
        policy: Arc<dyn Validator>,
        namespace: impl Into<String>,
        spec: QueueJobSpec,
    ) -> Self {
        Self {
            webhook,
            policy,
            namespace: namespace.into(),
            spec: Arc::new(spec),
        }
    }

    /// Sequentially issue `iterations` calls per backend and collect
    /// latency samples. The webhook phase runs to completion before the
    /// policy phase starts; the phases are deliberately not interleaved
    /// so a regression is attributable to one backend.
    pub async fn run_comparison(&self, iterations: usize) -> ValidationPerformance {
        let mut result = ValidationPerformance {
            total_requests: iterations,
            ..Default::default()
        };

        info!(iterations, "Running sequential latency comparison");

        for _ in 0..iterations {
            match self
                .webhook
                .validate(&self.namespace, &self.spec, Operation::Create)
                .await
            {
                Ok(validation) => result.webhook_latency.record(validation.latency),
                Err(err) => {
                    warn!(backend = self.webhook.backend_name(), error = %err, "Validation call failed");
                    result.webhook_errors += 1;
                }
            }
        }

        for _ in 0..iterations {
            match self
                .policy
                .validate(&self.namespace, &self.spec, Operation::Create)
                .await
            {
                Ok(validation) => result.policy_latency.record(validation.latency),
                Err(err) => {
                    warn!(backend = self.policy.backend_name(), error = %err, "Validation call failed");
                    result.policy_errors += 1;
                }
            }
        }

        result
    }

    /// Issue one concurrent call per backend on a fixed interval for
    /// the given wall-clock duration.
    ///
    /// New ticks stop at the deadline, but in-flight calls are never
    /// abandoned: the result is finalized only after every launched
    /// call has completed. There is no per-call timeout beyond the
    /// adapter's own round trip and no retries.
    pub async fn run_burst_load(
        &self,
        requests_per_second: u32,
        duration: Duration,
    ) -> BurstLoadResult {
        let counters = Arc::new(Mutex::new(BurstCounters::default()));
        let mut inflight = Vec::new();

        if requests_per_second > 0 && !duration.is_zero() {
            let interval = Duration::from_secs(1) / requests_per_second;
            info!(requests_per_second, ?duration, "Starting burst load window");

            let deadline = tokio::time::Instant::now() + duration;
            let mut ticker = tokio::time::interval(interval);

            loop {
                tokio::select! {
                    biased;
                    _ = tokio::time::sleep_until(deadline) => break,
                    _ = ticker.tick() => {
                        inflight.push(self.spawn_webhook_call(&counters));
                        inflight.push(self.spawn_policy_call(&counters));
                    }
                }
            }

            debug!(launched = inflight.len(), "Deadline reached, draining in-flight calls");
        }

        futures::future::join_all(inflight).await;

        let counters = counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (webhook_error_rate, policy_error_rate) = if counters.total_requests > 0 {
            (
                counters.webhook_errors as f64 / counters.total_requests as f64,
                counters.policy_errors as f64 / counters.total_requests as f64,
            )
        } else {
            (0.0, 0.0)
        };

        BurstLoadResult {
            duration,
            request_count: counters.total_requests,
            webhook_error_rate,
            policy_error_rate,
            timestamp: Timestamp::now(),
        }
    }

    fn spawn_webhook_call(
        &self,
        counters: &Arc<Mutex<BurstCounters>>,
    ) -> tokio::task::JoinHandle<()> {
        let validator = self.webhook.clone();
        let counters = counters.clone();
        let namespace = self.namespace.clone();
        let spec = self.spec.clone();
        tokio::spawn(async move {
            let outcome = validator.validate(&namespace, &spec, Operation::Create).await;
            let mut counters = counters.lock().unwrap_or_else(PoisonError::into_inner);
            counters.total_requests += 1;
            if outcome.is_err() {
                counters.webhook_errors += 1;
            }
        })
    }

    fn spawn_policy_call(
        &self,
        counters: &Arc<Mutex<BurstCounters>>,
    ) -> tokio::task::JoinHandle<()> {
        let validator = self.policy.clone();
        let counters = counters.clone();
        let namespace = self.namespace.clone();
        let spec = self.spec.clone();
        tokio::spawn(async move {
            let outcome = validator.validate(&namespace, &spec, Operation::Create).await;
            let mut counters = counters.lock().unwrap_or_else(PoisonError::into_inner);
            if outcome.is_err() {
                counters.policy_errors += 1;
            }
        })
    }
}
