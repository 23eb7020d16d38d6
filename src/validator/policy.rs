//! Policy-path validation adapter.
//!
//! Exercises the native ValidatingAdmissionPolicy by submitting the
//! same QueueJob as an untyped object with server-side dry-run. Using
//! the dynamic API mirrors how the policy path is driven in migration
//! testing: the object goes through the apiserver's CEL evaluation
//! without any webhook-era client types in the loop. Which path
//! enforces is a cluster-side concern (policy bindings present,
//! webhook configuration absent).

use std::time::Instant;

use async_trait::async_trait;
use kube::api::{
    Api, ApiResource, DeleteParams, DynamicObject, GroupVersionKind, Patch, PatchParams,
    PostParams,
};
use kube::Client;
use tracing::{debug, instrument};

use crate::crd::{GROUP, KIND, PLURAL, QueueJobSpec, VERSION};

use super::{dry_run_name, Operation, ValidationResult, Validator, ValidatorError};

/// Field manager recorded for dry-run apply requests.
const FIELD_MANAGER: &str = "admission-parity-policy";

/// Validator backed by the ValidatingAdmissionPolicy path.
pub struct PolicyValidator {
    client: Client,
    resource: ApiResource,
}

impl PolicyValidator {
    pub fn new(client: Client) -> Self {
        let gvk = GroupVersionKind::gvk(GROUP, VERSION, KIND);
        Self {
            client,
            resource: ApiResource::from_gvk_with_plural(&gvk, PLURAL),
        }
    }

    fn build_object(
        &self,
        name: &str,
        namespace: &str,
        spec: &QueueJobSpec,
    ) -> Result<DynamicObject, ValidatorError> {
        let mut object = DynamicObject::new(name, &self.resource).within(namespace);
        object.data = serde_json::json!({ "spec": serde_json::to_value(spec)? });
        Ok(object)
    }
}

#[async_trait]
impl Validator for PolicyValidator {
    #[instrument(skip(self, spec), fields(backend = self.backend_name(), %operation))]
    async fn validate(
        &self,
        namespace: &str,
        spec: &QueueJobSpec,
        operation: Operation,
    ) -> Result<ValidationResult, ValidatorError> {
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &self.resource);
        let name = dry_run_name("parity-policy");
        let object = self.build_object(&name, namespace, spec)?;

        let start = Instant::now();
        let outcome = match operation {
            Operation::Create => {
                let params = PostParams {
                    dry_run: true,
                    field_manager: None,
                };
                api.create(&params, &object).await.map(|_| ())
            }
            Operation::Update => {
                let params = PatchParams {
                    dry_run: true,
                    field_manager: Some(FIELD_MANAGER.to_string()),
                    ..Default::default()
                };
                api.patch(&name, &params, &Patch::Apply(&object))
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
            Err(kube::Error::Api(status)) => {
                debug!(name = %name, code = status.code, "Dry-run admission denied");
                Ok(ValidationResult::denied(status.message, latency))
            }
            Err(err) => Err(ValidatorError::Kube(err)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "policy"
    }
}
