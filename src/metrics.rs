//! Run-wide metrics collection and report rendering.
//!
//! One collector instance is constructed per test run and passed by
//! reference to every recorder; its record vectors sit behind a single
//! mutex so burst-load tasks and the scenario loop can append
//! concurrently.

use std::sync::{Mutex, PoisonError};

use jiff::Timestamp;

use crate::compare::ComparisonResult;
use crate::perf::{BurstLoadResult, ValidationPerformance};

/// One recorded scenario comparison.
#[derive(Debug, Clone)]
pub struct JobComparisonRecord {
    pub scenario_name: String,
    pub comparison: ComparisonResult,
    pub timestamp: Timestamp,
}

/// One recorded sequential performance comparison.
#[derive(Debug)]
pub struct PerformanceRecord {
    pub resource_type: String,
    pub performance: ValidationPerformance,
    pub timestamp: Timestamp,
}

#[derive(Default)]
struct CollectorState {
    job_comparisons: Vec<JobComparisonRecord>,
    perf_comparisons: Vec<PerformanceRecord>,
    burst_results: Vec<BurstLoadResult>,
}

/// Accumulates comparison and load-test outcomes for one test run.
#[derive(Default)]
pub struct MetricsCollector {
    state: Mutex<CollectorState>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the comparison outcome for one named scenario.
    pub fn record_job_comparison(&self, scenario_name: impl Into<String>, comparison: ComparisonResult) {
        let mut state = self.lock();
        state.job_comparisons.push(JobComparisonRecord {
            scenario_name: scenario_name.into(),
            comparison,
            timestamp: Timestamp::now(),
        });
    }

    /// Record a sequential performance comparison for one resource type.
    pub fn record_performance_comparison(
        &self,
        resource_type: impl Into<String>,
        performance: ValidationPerformance,
    ) {
        let mut state = self.lock();
        state.perf_comparisons.push(PerformanceRecord {
            resource_type: resource_type.into(),
            performance,
            timestamp: Timestamp::now(),
        });
    }

    /// Record one burst load window.
    pub fn record_burst_load_comparison(&self, result: BurstLoadResult) {
        let mut state = self.lock();
        state.burst_results.push(result);
    }

    /// Number of recorded scenario comparisons.
    pub fn comparison_count(&self) -> usize {
        self.lock().job_comparisons.len()
    }

    /// Render the run's textual report.
    ///
    /// With zero recorded comparisons this produces a labeled no-data
    /// message instead of dividing by zero.
    pub fn generate_report(&self) -> String {
        let state = self.lock();

        let mut report = String::from("Webhook-Policy Equivalence Test Report\n");
        report.push_str("=======================================\n\n");

        if state.job_comparisons.is_empty() {
            report.push_str("No comparison data recorded.\n");
        } else {
            let total = state.job_comparisons.len();
            let total_score: f64 = state
                .job_comparisons
                .iter()
                .map(|record| record.comparison.equivalence_score)
                .sum();
            let failures = state
                .job_comparisons
                .iter()
                .filter(|record| !record.comparison.matched)
                .count();
            let success_rate = (total - failures) as f64 / total as f64 * 100.0;

            report.push_str(&format!(
                "Overall Equivalence Score: {:.2}%\n",
                total_score / total as f64 * 100.0
            ));
            report.push_str(&format!("Total Test Scenarios: {total}\n"));
            report.push_str(&format!("Failed Scenarios: {failures}\n"));
            report.push_str(&format!("Success Rate: {success_rate:.1}%\n\n"));

            if failures > 0 {
                report.push_str("Failed Scenarios:\n");
                for record in &state.job_comparisons {
                    if !record.comparison.matched {
                        report.push_str(&format!(
                            "- {}: {}\n",
                            record.scenario_name,
                            record.comparison.differences.join("; ")
                        ));
                    }
                }
                report.push('\n');
            }
        }

        if !state.perf_comparisons.is_empty() {
            report.push_str("Performance Comparisons:\n");
            for record in &state.perf_comparisons {
                let perf = &record.performance;
                report.push_str(&format!(
                    "- {}: {} requests/backend; webhook p95={:?} p99={:?} errors={}; policy p95={:?} p99={:?} errors={}\n",
                    record.resource_type,
                    perf.total_requests,
                    perf.webhook_latency.p95(),
                    perf.webhook_latency.p99(),
                    perf.webhook_errors,
                    perf.policy_latency.p95(),
                    perf.policy_latency.p99(),
                    perf.policy_errors
                ));
            }
            report.push('\n');
        }

        if !state.burst_results.is_empty() {
            report.push_str("Burst Load Windows:\n");
            for burst in &state.burst_results {
                report.push_str(&format!(
                    "- {:?} window: {} request pairs; webhook error rate {:.1}%; policy error rate {:.1}%\n",
                    burst.duration,
                    burst.request_count,
                    burst.webhook_error_rate * 100.0,
                    burst.policy_error_rate * 100.0
                ));
            }
        }

        report
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CollectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
