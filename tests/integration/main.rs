// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::string_slice
)]

//! Integration tests for the admission parity harness.
//!
//! These tests require a running Kubernetes cluster accessible via
//! kubeconfig. Tests are marked with #[ignore] and must be run
//! explicitly:
//!
//! ```bash
//! cargo test --test integration -- --ignored
//! ```
//!
//! The tests use your existing kubeconfig (~/.kube/config or the
//! KUBECONFIG env var). The QueueJob CRD is installed on demand; the
//! webhook configuration and admission policies under test are
//! expected to be deployed by the cluster fixture.
//!
//! ## Design Principles
//!
//! - **Isolation**: each test creates its own namespace
//! - **RAII Cleanup**: TestNamespace deletes itself even on panic
//! - **Dry-run Only**: no test persists a QueueJob

// Shared test fixtures
#[path = "../common/mod.rs"]
mod common;

mod parity_tests;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Api, Patch, PatchParams};
use kube::{Client, CustomResourceExt};
use std::time::Duration;

use admission_parity::crd::QueueJob;

/// Install the QueueJob CRD and wait until it is established.
pub async fn ensure_crd_installed(client: Client) {
    let crds: Api<CustomResourceDefinition> = Api::all(client);
    let crd = QueueJob::crd();
    let name = crd.metadata.name.clone().expect("CRD must have a name");

    let params = PatchParams::apply("admission-parity-tests").force();
    crds.patch(&name, &params, &Patch::Apply(&crd))
        .await
        .expect("Failed to apply QueueJob CRD");

    for _ in 0..40 {
        if let Ok(applied) = crds.get(&name).await {
            let established = applied
                .status
                .as_ref()
                .and_then(|status| status.conditions.as_ref())
                .is_some_and(|conditions| {
                    conditions
                        .iter()
                        .any(|c| c.type_ == "Established" && c.status == "True")
                });
            if established {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
    panic!("QueueJob CRD was not established in time");
}
