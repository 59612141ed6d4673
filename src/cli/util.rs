//! CLI Common Utilities
//!
//! Shared initialization and context management for CLI commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::runtime::Runtime;

use crate::client::{DevOpsClient, SharedApi};
use crate::config::{Config, ConfigLoader};
use crate::types::{Result, WikiError};

/// Output format for listings and config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Connection settings given on the command line; they win over every
/// config source
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub organization: Option<String>,
    pub project: Option<String>,
}

impl ConnectionOverrides {
    fn apply(&self, config: &mut Config) {
        if let Some(organization) = &self.organization {
            config.connection.organization = Some(organization.clone());
        }
        if let Some(project) = &self.project {
            config.connection.project = Some(project.clone());
        }
    }
}

/// Command execution context
///
/// Holds the resolved configuration. The HTTP client is built on demand so
/// config-only commands work without credentials.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// Explicit `--config` file, if any
    pub config_file: Option<PathBuf>,
}

impl CommandContext {
    /// Resolve configuration from all sources plus command-line overrides
    pub fn load(config_file: Option<&Path>, overrides: &ConnectionOverrides) -> Result<Self> {
        if let Some(path) = config_file
            && !path.exists()
        {
            return Err(WikiError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let mut config = ConfigLoader::load(config_file)?;
        overrides.apply(&mut config);

        Ok(Self {
            config,
            config_file: config_file.map(Path::to_path_buf),
        })
    }

    /// Authenticated client for the configured project
    pub fn client(&self) -> Result<DevOpsClient> {
        let credentials = self.config.credentials()?;
        DevOpsClient::new(&credentials, &self.config)
    }

    pub fn api(&self) -> Result<SharedApi> {
        Ok(Arc::new(self.client()?))
    }
}

/// Single-threaded runtime; all concurrency is request I/O
pub fn runtime() -> Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
