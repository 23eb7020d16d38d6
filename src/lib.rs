//! admission-parity library crate
//!
//! Runs the same admission request through two independent validation
//! paths (the legacy webhook and the native ValidatingAdmissionPolicy)
//! via server-side dry-run, compares the outcomes, and aggregates
//! equivalence and latency statistics into a report.

pub mod compare;
pub mod crd;
pub mod metrics;
pub mod perf;
pub mod scenario;
pub mod stats;
pub mod suite;
pub mod validator;

pub use compare::{ComparisonEngine, ComparisonResult};
pub use metrics::MetricsCollector;
pub use perf::{BurstLoadResult, PerformanceHarness, ValidationPerformance};
pub use stats::LatencyStats;
pub use suite::{EquivalenceSuite, ScenarioOutcome, SuiteOutcome};
pub use validator::{Operation, ValidationResult, Validator, ValidatorError};
