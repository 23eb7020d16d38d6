//! Webhook-path validation adapter.
//!
//! Exercises the legacy admission webhook by submitting a typed
//! QueueJob with server-side dry-run through the regular API machinery.
//! Whether the webhook is the enforcing path is a cluster-side concern
//! (webhook configuration present, policies absent); this adapter only
//! issues the request and normalizes the outcome.

use std::time::Instant;

use async_trait::async_trait;
use kube::api::{Api, DeleteParams, Patch, PatchParams, PostParams};
use kube::Client;
use tracing::{debug, instrument};

use crate::crd::{QueueJob, QueueJobSpec};

use super::{dry_run_name, Operation, ValidationResult, Validator, ValidatorError};

/// Field manager recorded for dry-run apply requests.
const FIELD_MANAGER: &str = "admission-parity-webhook";

/// Validator backed by the legacy admission webhook path.
pub struct WebhookValidator {
    client: Client,
}

impl WebhookValidator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Validator for WebhookValidator {
    #[instrument(skip(self, spec), fields(backend = self.backend_name(), %operation))]
    async fn validate(
        &self,
        namespace: &str,
        spec: &QueueJobSpec,
        operation: Operation,
    ) -> Result<ValidationResult, ValidatorError> {
        let api: Api<QueueJob> = Api::namespaced(self.client.clone(), namespace);
        let name = dry_run_name("parity-webhook");
        let job = QueueJob::new(&name, spec.clone());

        // Latency spans the API round trip only; object construction
        // happens before the clock starts.
        let start = Instant::now();
        let outcome = match operation {
            Operation::Create => {
                let params = PostParams {
                    dry_run: true,
                    field_manager: None,
                };
                api.create(&params, &job).await.map(|_| ())
            }
            Operation::Update => {
                let params = PatchParams {
                    dry_run: true,
                    field_manager: Some(FIELD_MANAGER.to_string()),
                    ..Default::default()
                };
                api.patch(&name, &params, &Patch::Apply(&job))
                    .await
                    .map(|_| ())
            }
            Operation::Delete => {
                let params = DeleteParams {
                    dry_run: true,
                    ..Default::default()
                };
                api.delete(&name, &params).await.map(|_| ())
            }
        };
        let latency = start.elapsed();

        match outcome {
            Ok(()) => {
                debug!(name = %name, ?latency, "Dry-run admission allowed");
                Ok(ValidationResult::allowed(latency))
            }
            // An API status is the server's admission verdict; its
            // message is preserved verbatim for similarity scoring.
            Err(kube::Error::Api(status)) => {
                debug!(name = %name, code = status.code, "Dry-run admission denied");
                Ok(ValidationResult::denied(status.message, latency))
            }
            Err(err) => Err(ValidatorError::Kube(err)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "webhook"
    }
}
