//! Credential handling
//!
//! Azure DevOps accepts a personal access token as the password of HTTP
//! Basic authentication with an empty user name.

use base64::{Engine as _, engine::general_purpose};
use secrecy::{ExposeSecret, SecretString};

/// Organization, project and token identifying whose wikis are exported
pub struct Credentials {
    organization: String,
    project: String,
    /// Token stored securely - never exposed in logs or debug output
    pat: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("organization", &self.organization)
            .field("project", &self.project)
            .field("pat", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    pub fn new(
        organization: impl Into<String>,
        project: impl Into<String>,
        pat: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            project: project.into(),
            pat: SecretString::from(pat.into()),
        }
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn pat(&self) -> &SecretString {
        &self.pat
    }

    /// Value for the `Authorization` header
    pub fn authorization(&self) -> SecretString {
        basic_auth_header(&self.pat)
    }
}

/// Encode a personal access token as a Basic `Authorization` header value
pub fn basic_auth_header(pat: &SecretString) -> SecretString {
    let encoded = general_purpose::STANDARD.encode(format!(":{}", pat.expose_secret()));
    SecretString::from(format!("Basic {}", encoded))
}
