//! Blocking HTTP implementation of [`KubeApi`].

use super::certificate::CertificateIdentity;
use super::kubeconfig::{Kubeconfig, ResolvedKubeconfig};
use super::{K8sError, K8sResult, KubeApi, ObjectKind};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Identity, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const JSON_PATCH: &str = "application/json-patch+json";

#[derive(Deserialize)]
struct ObjectList {
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug)]
pub struct KubeClient {
    http: Client,
    server: String,
    namespace: String,
    identity: CertificateIdentity,
}

impl KubeClient {
    /// Build a client from a kubeconfig file, optionally forcing the namespace.
    pub fn from_kubeconfig(path: &Path, namespace: Option<&str>) -> K8sResult<Self> {
        let (config, path) = Kubeconfig::load(path)?;
        let resolved = config.resolve(namespace, path.parent())?;
        Self::new(resolved, DEFAULT_TIMEOUT)
    }

    pub fn new(resolved: ResolvedKubeconfig, timeout: Duration) -> K8sResult<Self> {
        let mut pem = std::fs::read(&resolved.client_certificate).map_err(|e| {
            K8sError::BadConfig(format!(
                "Failed to read client certificate {}: {}",
                resolved.client_certificate.display(),
                e
            ))
        })?;
        let identity = CertificateIdentity::from_pem(&pem)?;
        let key = std::fs::read(&resolved.client_key).map_err(|e| {
            K8sError::BadConfig(format!(
                "Failed to read client key {}: {}",
                resolved.client_key.display(),
                e
            ))
        })?;
        pem.push(b'\n');
        pem.extend_from_slice(&key);
        let tls_identity = Identity::from_pem(&pem)?;

        // The API endpoint uses a self-signed certificate.
        let http = Client::builder()
            .identity(tls_identity)
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            server: resolved.server,
            namespace: resolved.namespace,
            identity,
        })
    }

    /// Name of the account the client authenticates as, the certificate's CN.
    pub fn user(&self) -> &str {
        &self.identity.common_name
    }

    pub fn identity(&self) -> &CertificateIdentity {
        &self.identity
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn url(&self, kind: ObjectKind, name: Option<&str>) -> String {
        object_url(&self.server, &self.namespace, kind, name)
    }

    fn send(&self, request: RequestBuilder, kind: ObjectKind, name: &str) -> K8sResult<Response> {
        let response = request.send()?;
        let status = response.status();
        debug!(%status, %kind, name, "control plane response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => K8sError::NotFound {
                kind,
                name: name.to_string(),
            },
            StatusCode::BAD_REQUEST => K8sError::BadRequest(body),
            other => K8sError::Http {
                status: other.as_u16(),
                body,
            },
        })
    }
}

/// `{server}/{api|apis}/{version}/namespaces/{namespace}/{kind}[/{name}]`
pub fn object_url(server: &str, namespace: &str, kind: ObjectKind, name: Option<&str>) -> String {
    let base = format!(
        "{}/{}/{}/namespaces/{}/{}",
        server,
        kind.api_root(),
        kind.api_version(),
        namespace,
        kind.resource()
    );
    match name {
        Some(name) => format!("{}/{}", base, name),
        None => base,
    }
}

fn selector_query(selector: Option<&str>) -> Vec<(&'static str, &str)> {
    selector
        .map(|selector| vec![("labelSelector", selector)])
        .unwrap_or_default()
}

impl KubeApi for KubeClient {
    fn get_object(&self, kind: ObjectKind, name: &str) -> K8sResult<Value> {
        let request = self.http.get(self.url(kind, Some(name)));
        Ok(self.send(request, kind, name)?.json()?)
    }

    fn get_objects(&self, kind: ObjectKind, selector: Option<&str>) -> K8sResult<Vec<Value>> {
        let request = self
            .http
            .get(self.url(kind, None))
            .query(&selector_query(selector));
        let list: ObjectList = self.send(request, kind, selector.unwrap_or(""))?.json()?;
        Ok(list.items)
    }

    fn create_object(&self, kind: ObjectKind, spec: &Value) -> K8sResult<Value> {
        let request = self.http.post(self.url(kind, None)).json(spec);
        Ok(self.send(request, kind, "")?.json()?)
    }

    fn patch_object(&self, kind: ObjectKind, name: &str, patches: &[Value]) -> K8sResult<Value> {
        let body = serde_json::to_vec(patches)
            .map_err(|e| K8sError::BadRequest(format!("unserializable patch: {}", e)))?;
        let request = self
            .http
            .patch(self.url(kind, Some(name)))
            .header(CONTENT_TYPE, JSON_PATCH)
            .body(body);
        Ok(self.send(request, kind, name)?.json()?)
    }

    fn delete_object(&self, kind: ObjectKind, name: &str) -> K8sResult<()> {
        let request = self.http.delete(self.url(kind, Some(name)));
        self.send(request, kind, name)?;
        Ok(())
    }

    fn delete_objects(&self, kind: ObjectKind, selector: Option<&str>) -> K8sResult<()> {
        let request = self
            .http
            .delete(self.url(kind, None))
            .query(&selector_query(selector));
        self.send(request, kind, selector.unwrap_or(""))?;
        Ok(())
    }
}
