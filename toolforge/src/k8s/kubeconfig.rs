//! Kubeconfig loading.
//!
//! Only certificate based authentication is supported. A context named
//! `toolforge` always wins over the configured `current-context`.

use super::{K8sError, K8sResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const PREFERRED_CONTEXT: &str = "toolforge";
const DEFAULT_CURRENT_CONTEXT: &str = "default";

#[derive(Debug, Clone, Deserialize)]
pub struct Kubeconfig {
    #[serde(default, rename = "current-context")]
    pub current_context: Option<String>,
    #[serde(default)]
    pub contexts: Vec<NamedContext>,
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,
    #[serde(default)]
    pub users: Vec<NamedUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: Context,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Context {
    pub cluster: String,
    pub user: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: Cluster,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cluster {
    pub server: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedUser {
    pub name: String,
    pub user: User,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    #[serde(default, rename = "client-certificate")]
    pub client_certificate: Option<PathBuf>,
    #[serde(default, rename = "client-key")]
    pub client_key: Option<PathBuf>,
}

/// Everything the HTTP client needs, with file paths made absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKubeconfig {
    pub server: String,
    pub namespace: String,
    pub client_certificate: PathBuf,
    pub client_key: PathBuf,
}

impl Kubeconfig {
    pub fn load(path: &Path) -> K8sResult<(Self, PathBuf)> {
        let path = expand_home(path);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            K8sError::BadConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::parse(&content).map_err(|e| {
            K8sError::BadConfig(format!("Got an error parsing the config {}: {}", path.display(), e))
        })?;
        Ok((config, path))
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Pick the `toolforge` context, falling back to the current context.
    pub fn select_context(&self) -> K8sResult<&Context> {
        let current = self
            .current_context
            .as_deref()
            .unwrap_or(DEFAULT_CURRENT_CONTEXT);

        let mut fallback = None;
        for named in &self.contexts {
            if named.name == PREFERRED_CONTEXT {
                return Ok(&named.context);
            }
            if named.name == current {
                fallback = Some(&named.context);
            }
        }

        fallback.ok_or_else(|| {
            K8sError::BadConfig(format!(
                "Unable to find a '{}' context or current context '{}' in the kubectl config.",
                PREFERRED_CONTEXT, current
            ))
        })
    }

    /// Resolve the selected context into server, namespace and credentials.
    ///
    /// Relative credential paths are taken relative to `base_dir`, like kubectl does.
    pub fn resolve(
        &self,
        namespace: Option<&str>,
        base_dir: Option<&Path>,
    ) -> K8sResult<ResolvedKubeconfig> {
        let context = self.select_context()?;

        let cluster = self
            .clusters
            .iter()
            .find(|named| named.name == context.cluster)
            .ok_or_else(|| {
                K8sError::BadConfig(format!(
                    "Name {} not found in clusters section of config",
                    context.cluster
                ))
            })?;
        let user = self
            .users
            .iter()
            .find(|named| named.name == context.user)
            .ok_or_else(|| {
                K8sError::BadConfig(format!(
                    "Name {} not found in users section of config",
                    context.user
                ))
            })?;

        let (Some(certificate), Some(key)) = (&user.user.client_certificate, &user.user.client_key)
        else {
            return Err(K8sError::BadConfig(format!(
                "Currently only certificate based authorization is supported, but none found for user {}.",
                user.name
            )));
        };

        let namespace = namespace
            .map(str::to_string)
            .or_else(|| context.namespace.clone())
            .ok_or_else(|| {
                K8sError::BadConfig("No namespace configured for the selected context".to_string())
            })?;

        Ok(ResolvedKubeconfig {
            server: cluster.cluster.server.trim_end_matches('/').to_string(),
            namespace,
            client_certificate: relative_to(base_dir, certificate),
            client_key: relative_to(base_dir, key),
        })
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

fn relative_to(base_dir: Option<&Path>, path: &Path) -> PathBuf {
    let path = expand_home(path);
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}
