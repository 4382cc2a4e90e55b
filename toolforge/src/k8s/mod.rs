//! Control plane access.
//!
//! Commands talk to the cluster through the [`KubeApi`] trait so the status
//! walker and the build operations can be exercised against in-memory fakes.
//! [`KubeClient`] is the HTTP implementation used by the binary.

pub mod certificate;
pub mod client;
pub mod kubeconfig;
pub mod types;

pub use certificate::CertificateIdentity;
pub use client::KubeClient;
pub use kubeconfig::{Kubeconfig, ResolvedKubeconfig};

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Object kinds the CLI reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    PipelineRuns,
    Pods,
}

impl ObjectKind {
    /// Plural resource name used in URLs.
    pub fn resource(&self) -> &'static str {
        match self {
            ObjectKind::PipelineRuns => "pipelineruns",
            ObjectKind::Pods => "pods",
        }
    }

    pub fn api_version(&self) -> &'static str {
        match self {
            ObjectKind::PipelineRuns => "tekton.dev/v1beta1",
            ObjectKind::Pods => "v1",
        }
    }

    /// Core objects live under `/api`, everything else under `/apis`.
    pub fn api_root(&self) -> &'static str {
        if self.api_version() == "v1" {
            "api"
        } else {
            "apis"
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource())
    }
}

#[derive(Debug, Error)]
pub enum K8sError {
    #[error("Unable to find an object with name '{name}' of kind '{kind}'")]
    NotFound { kind: ObjectKind, name: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Control plane returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to reach the control plane: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Bad kubeconfig: {0}")]
    BadConfig(String),
}

impl K8sError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, K8sError::NotFound { .. })
    }
}

pub type K8sResult<T> = Result<T, K8sError>;

/// Minimal REST surface the CLI needs from the control plane.
pub trait KubeApi {
    fn get_object(&self, kind: ObjectKind, name: &str) -> K8sResult<Value>;

    fn get_objects(&self, kind: ObjectKind, selector: Option<&str>) -> K8sResult<Vec<Value>>;

    fn create_object(&self, kind: ObjectKind, spec: &Value) -> K8sResult<Value>;

    /// Apply JSON patch operations to a single object.
    fn patch_object(&self, kind: ObjectKind, name: &str, patches: &[Value]) -> K8sResult<Value>;

    fn delete_object(&self, kind: ObjectKind, name: &str) -> K8sResult<()>;

    fn delete_objects(&self, kind: ObjectKind, selector: Option<&str>) -> K8sResult<()>;
}
