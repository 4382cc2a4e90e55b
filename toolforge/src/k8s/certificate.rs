//! Identity carried by the kubeconfig client certificate.
//!
//! The subject's common name is the account runs are labelled with; its
//! organizations are the groups the account belongs to.

use super::{K8sError, K8sResult};
use x509_parser::pem::parse_x509_pem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateIdentity {
    pub common_name: String,
    pub organizations: Vec<String>,
}

impl CertificateIdentity {
    /// Subject of the first certificate in `pem`.
    pub fn from_pem(pem: &[u8]) -> K8sResult<Self> {
        let (_, pem) = parse_x509_pem(pem)
            .map_err(|e| K8sError::BadConfig(format!("Invalid client certificate: {}", e)))?;
        let certificate = pem
            .parse_x509()
            .map_err(|e| K8sError::BadConfig(format!("Invalid client certificate: {}", e)))?;
        let subject = certificate.subject();

        let common_name = subject
            .iter_common_name()
            .next()
            .and_then(|attribute| attribute.as_str().ok())
            .ok_or_else(|| {
                K8sError::BadConfig("Client certificate has no common name".to_string())
            })?
            .to_string();
        let organizations = subject
            .iter_organization()
            .filter_map(|attribute| attribute.as_str().ok())
            .map(str::to_string)
            .collect();

        Ok(Self {
            common_name,
            organizations,
        })
    }

    /// Whether any of the certificate's organizations is one of `groups`.
    pub fn in_any_group(&self, groups: &[String]) -> bool {
        self.organizations.iter().any(|org| groups.contains(org))
    }
}
