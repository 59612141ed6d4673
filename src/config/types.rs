//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Credentials are accepted from any source but never written back out.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::client::Credentials;
use crate::constants::{api, export, network, retry};
use crate::types::{Result, WikiError};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Service location and credentials
    pub connection: ConnectionConfig,

    /// HTTP timeouts
    pub network: NetworkConfig,

    /// Retry policy for failed requests
    pub retry: RetryConfig,

    /// Export output settings
    pub export: ExportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            connection: ConnectionConfig::default(),
            network: NetworkConfig::default(),
            retry: RetryConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `WikiError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.network.timeout_secs == 0 {
            return Err(WikiError::Config(
                "network.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.network.connect_timeout_secs == 0 {
            return Err(WikiError::Config(
                "network.connect_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.retry.factor < 1.0 {
            return Err(WikiError::Config(format!(
                "retry.factor must be at least 1.0, got {}",
                self.retry.factor
            )));
        }

        if self.export.max_concurrency == Some(0) {
            return Err(WikiError::Config(
                "export.max_concurrency must be greater than 0".to_string(),
            ));
        }

        if url::Url::parse(&self.connection.api_base).is_err() {
            return Err(WikiError::Config(format!(
                "connection.api_base is not a valid URL: {}",
                self.connection.api_base
            )));
        }

        Ok(())
    }

    /// Resolve the credentials needed to talk to the service
    pub fn credentials(&self) -> Result<Credentials> {
        let organization = required(&self.connection.organization, "organization", "ORGANIZATION")?;
        let project = required(&self.connection.project, "project", "PROJECT")?;
        let pat = required(&self.connection.pat, "pat", "AZURE_DEVOPS_PAT")?;
        Ok(Credentials::new(organization, project, pat))
    }
}

fn required(value: &Option<String>, key: &str, env: &str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(WikiError::Config(format!(
            "Missing connection.{}. Set {} or add it to the config file",
            key, env
        ))),
    }
}

// =============================================================================
// Connection Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Service root URL
    pub api_base: String,

    /// Azure DevOps organization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    /// Project inside the organization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Personal access token. Never serialized to output
    #[serde(skip_serializing)]
    pub pat: Option<String>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("api_base", &self.api_base)
            .field("organization", &self.organization)
            .field("project", &self.project)
            .field("pat", &self.pat.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            api_base: api::DEFAULT_API_BASE.to_string(),
            organization: None,
            project: None,
            pat: None,
        }
    }
}

// =============================================================================
// Network Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Upper bound for one request, including the response body
    pub timeout_secs: u64,

    /// Upper bound for establishing a connection
    pub connect_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: network::CONNECTION_TIMEOUT_SECS,
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

// =============================================================================
// Retry Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Additional attempts after the first failure (0 disables retries)
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds)
    pub min_delay_ms: u64,

    /// Maximum delay between retries (seconds)
    pub max_delay_secs: u64,

    /// Backoff multiplier
    pub factor: f32,

    /// Randomize delays to spread concurrent retries
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: retry::DEFAULT_MAX_RETRIES,
            min_delay_ms: retry::BASE_DELAY_MS,
            max_delay_secs: retry::MAX_DELAY_SECS,
            factor: retry::BACKOFF_FACTOR,
            jitter: true,
        }
    }
}

// =============================================================================
// Export Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory receiving one `<wiki>.json` per wiki
    pub output_dir: PathBuf,

    /// Keep exporting the remaining wikis when one fails
    pub isolate_failures: bool,

    /// Cap on in-flight content requests per wiki (unset = all pages at once)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,

    /// Pretty-print the output files
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(export::DEFAULT_OUTPUT_DIR),
            isolate_failures: false,
            max_concurrency: None,
            pretty: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn with_connection() -> Config {
        let mut config = Config::default();
        config.connection.organization = Some("contoso".to_string());
        config.connection.project = Some("Fabrikam".to_string());
        config.connection.pat = Some("s3cr3t".to_string());
        config
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.export.output_dir, PathBuf::from("wikis"));
        assert_eq!(config.retry.max_retries, 0);
        assert!(!config.export.isolate_failures);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.network.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(WikiError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_shrinking_backoff() {
        let mut config = Config::default();
        config.retry.factor = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.export.max_concurrency = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_resolved() {
        let creds = with_connection().credentials().unwrap();
        assert_eq!(creds.organization(), "contoso");
        assert_eq!(creds.project(), "Fabrikam");
        assert_eq!(creds.pat().expose_secret(), "s3cr3t");
    }

    #[test]
    fn test_credentials_missing_pat() {
        let mut config = with_connection();
        config.connection.pat = Some("  ".to_string());
        let err = config.credentials().unwrap_err();
        assert!(err.to_string().contains("AZURE_DEVOPS_PAT"));
    }

    #[test]
    fn test_pat_never_serialized() {
        let config = with_connection();
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("s3cr3t"));
        assert!(!format!("{:?}", config).contains("s3cr3t"));
    }
}
