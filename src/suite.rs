//! End-to-end equivalence suite.
//!
//! Drives every scenario through both validation paths, compares the
//! paired outcomes, and records them in the run's collector. The suite
//! never stops on a first mismatch: all scenarios are evaluated and the
//! report covers the full run.

use std::sync::Arc;

use kube::Client;
use tracing::{info, warn};

use crate::compare::{ComparisonEngine, ComparisonResult};
use crate::metrics::MetricsCollector;
use crate::scenario::TestScenario;
use crate::validator::{PolicyValidator, ValidationResult, Validator, WebhookValidator};

/// Outcome of one scenario run.
#[derive(Debug)]
pub enum ScenarioOutcome {
    /// Both backends completed; the pair was compared.
    Compared {
        comparison: ComparisonResult,
        /// Whether both outcomes satisfied the scenario's expectation.
        expectation_met: bool,
    },
    /// At least one backend failed to complete its dry-run call. No
    /// comparison is synthesized from a partial pair; the scenario is
    /// reported as errored, not as a mismatch.
    Errored { detail: String },
}

/// Per-scenario verdicts for one suite run.
#[derive(Debug, Default)]
pub struct SuiteOutcome {
    pub verdicts: Vec<(String, ScenarioOutcome)>,
}

impl SuiteOutcome {
    /// Scenarios whose pair compared as equivalent.
    pub fn matched_count(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|(_, outcome)| {
                matches!(outcome, ScenarioOutcome::Compared { comparison, .. } if comparison.matched)
            })
            .count()
    }

    /// Scenarios whose pair compared with discrepancies.
    pub fn mismatched_count(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|(_, outcome)| {
                matches!(outcome, ScenarioOutcome::Compared { comparison, .. } if !comparison.matched)
            })
            .count()
    }

    /// Scenarios where either backend call failed.
    pub fn errored_count(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ScenarioOutcome::Errored { .. }))
            .count()
    }

    /// Scenarios whose outcomes contradicted the catalog expectation.
    pub fn expectation_failures(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|(_, outcome)| {
                matches!(
                    outcome,
                    ScenarioOutcome::Compared {
                        expectation_met: false,
                        ..
                    }
                )
            })
            .count()
    }

    /// True when every scenario compared equivalent and met its
    /// expectation.
    pub fn all_passed(&self) -> bool {
        self.mismatched_count() == 0 && self.errored_count() == 0 && self.expectation_failures() == 0
    }
}

/// Owns both validators, the comparison engine, and the collector for
/// one run.
pub struct EquivalenceSuite {
    webhook: Arc<dyn Validator>,
    policy: Arc<dyn Validator>,
    engine: ComparisonEngine,
    collector: Arc<MetricsCollector>,
}

impl EquivalenceSuite {
    /// Build a suite with the real cluster-backed validators.
    pub fn new(client: Client, strict_mode: bool) -> Self {
        Self::with_validators(
            Arc::new(WebhookValidator::new(client.clone())),
            Arc::new(PolicyValidator::new(client)),
            strict_mode,
        )
    }

    /// Build a suite over arbitrary validator implementations.
    pub fn with_validators(
        webhook: Arc<dyn Validator>,
        policy: Arc<dyn Validator>,
        strict_mode: bool,
    ) -> Self {
        Self {
            webhook,
            policy,
            engine: ComparisonEngine::new(strict_mode),
            collector: Arc::new(MetricsCollector::new()),
        }
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn webhook_validator(&self) -> Arc<dyn Validator> {
        self.webhook.clone()
    }

    pub fn policy_validator(&self) -> Arc<dyn Validator> {
        self.policy.clone()
    }

    /// Run every scenario against both backends.
    ///
    /// For each scenario the webhook call runs first, then the policy
    /// call; the comparison is always between the pair produced for
    /// this invocation. A scenario where either call errors is recorded
    /// as errored and produces no comparison.
    pub async fn run(&self, namespace: &str, scenarios: &[TestScenario]) -> SuiteOutcome {
        let mut outcome = SuiteOutcome::default();

        for scenario in scenarios {
            info!(scenario = %scenario.name, "Running scenario");

            let webhook_result = self
                .webhook
                .validate(namespace, &scenario.spec, scenario.operation)
                .await;
            let policy_result = self
                .policy
                .validate(namespace, &scenario.spec, scenario.operation)
                .await;

            let (webhook_result, policy_result) = match (webhook_result, policy_result) {
                (Ok(webhook), Ok(policy)) => (webhook, policy),
                (webhook, policy) => {
                    let detail = describe_errors(webhook.err(), policy.err());
                    warn!(scenario = %scenario.name, detail = %detail, "Scenario inconclusive");
                    outcome
                        .verdicts
                        .push((scenario.name.clone(), ScenarioOutcome::Errored { detail }));
                    continue;
                }
            };

            let comparison = self.engine.compare(&webhook_result, &policy_result);
            let expectation_met = expectation_met(scenario, &webhook_result, &policy_result);

            if !comparison.matched {
                warn!(
                    scenario = %scenario.name,
                    score = comparison.equivalence_score,
                    "Backends disagree"
                );
            }

            self.collector
                .record_job_comparison(scenario.name.as_str(), comparison.clone());
            outcome.verdicts.push((
                scenario.name.clone(),
                ScenarioOutcome::Compared {
                    comparison,
                    expectation_met,
                },
            ));
        }

        outcome
    }
}

fn describe_errors(
    webhook: Option<crate::validator::ValidatorError>,
    policy: Option<crate::validator::ValidatorError>,
) -> String {
    match (webhook, policy) {
        (Some(w), Some(p)) => format!("webhook call failed: {w}; policy call failed: {p}"),
        (Some(w), None) => format!("webhook call failed: {w}"),
        (None, Some(p)) => format!("policy call failed: {p}"),
        (None, None) => "no error".to_string(),
    }
}

fn expectation_met(
    scenario: &TestScenario,
    webhook: &ValidationResult,
    policy: &ValidationResult,
) -> bool {
    if webhook.allowed != scenario.expected.allowed || policy.allowed != scenario.expected.allowed {
        return false;
    }

    if let Some(expected_substring) = &scenario.expected.error_contains {
        if scenario.expected.allowed {
            return true;
        }
        return webhook.error_message.contains(expected_substring)
            && policy.error_message.contains(expected_substring);
    }

    true
}
