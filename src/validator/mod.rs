//! Validation backends behind a single contract.
//!
//! Both admission paths (the legacy webhook and the native
//! ValidatingAdmissionPolicy) are driven through the [`Validator`]
//! trait so the comparison engine and performance harness are written
//! once against the abstraction. Every call is a server-side dry-run;
//! nothing is ever persisted.

mod policy;
mod webhook;

pub use policy::PolicyValidator;
pub use webhook::WebhookValidator;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::crd::QueueJobSpec;

/// Errors that prevent a dry-run admission round trip from completing.
///
/// A semantic denial is NOT an error: the backend rejecting the object
/// is a completed validation and surfaces as a [`ValidationResult`]
/// with `allowed == false`. An error here means the call itself failed
/// and the outcome is inconclusive.
#[derive(Error, Debug)]
pub enum ValidatorError {
    /// Transport-level Kubernetes client error (connection, protocol).
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// The resource spec could not be serialized for the wire.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Admission operation exercised by a validation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Normalized outcome of one completed validation attempt.
///
/// Immutable once returned. `error_message` carries the backend's
/// rejection text verbatim; the comparison engine scores textual
/// similarity against it, so adapters must not paraphrase.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the backend accepted the object.
    pub allowed: bool,
    /// Backend-provided rejection reason; empty when allowed.
    pub error_message: String,
    /// Non-fatal annotations from the backend.
    pub warnings: Vec<String>,
    /// Wall-clock time of the dry-run round trip, request to response.
    pub latency: Duration,
    /// Arbitrary backend metadata such as audit annotations.
    pub annotations: BTreeMap<String, String>,
}

impl ValidationResult {
    /// An accepted outcome.
    pub fn allowed(latency: Duration) -> Self {
        Self {
            allowed: true,
            error_message: String::new(),
            warnings: Vec::new(),
            latency,
            annotations: BTreeMap::new(),
        }
    }

    /// A denied outcome carrying the backend's message verbatim.
    pub fn denied(message: impl Into<String>, latency: Duration) -> Self {
        Self {
            allowed: false,
            error_message: message.into(),
            warnings: Vec::new(),
            latency,
            annotations: BTreeMap::new(),
        }
    }
}

/// Contract shared by both validation backends.
///
/// `validate` issues one server-side dry-run admission request for the
/// given spec and operation. Transport or serialization failures return
/// `Err` and must be treated as inconclusive by callers, never as an
/// implicit rejection.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(
        &self,
        namespace: &str,
        spec: &QueueJobSpec,
        operation: Operation,
    ) -> Result<ValidationResult, ValidatorError>;

    /// Short backend identifier used in logs and reports.
    fn backend_name(&self) -> &'static str;
}

/// Generate a unique object name so repeated dry-runs never collide.
pub(crate) fn dry_run_name(prefix: &str) -> String {
    let mut suffix = Uuid::new_v4().simple().to_string();
    suffix.truncate(8);
    format!("{prefix}-{suffix}")
}
