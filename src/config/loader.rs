//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/azwiki/config.toml)
//! 3. Project config (./azwiki.toml, or the file given with --config)
//! 4. Environment variables (AZWIKI_* prefix, `__` between sections)
//! 5. AZURE_DEVOPS_PAT / ORGANIZATION / PROJECT

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::constants::env as env_keys;
use crate::types::{Result, WikiError};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project (or explicit file) → env vars
    pub fn load(config_file: Option<&Path>) -> Result<Config> {
        let config: Config = Self::figment(config_file)
            .extract()
            .map_err(|e| WikiError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| WikiError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = config_file
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::project_config_path);
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // AZWIKI_RETRY__MAX_RETRIES -> retry.max_retries
        figment = figment.merge(
            Env::prefixed(env_keys::PREFIX)
                .split("__")
                .lowercase(true),
        );

        figment.merge(
            Env::raw()
                .only(&[env_keys::PAT, env_keys::ORGANIZATION, env_keys::PROJECT])
                .map(|key| {
                    if key.as_str().eq_ignore_ascii_case(env_keys::PAT) {
                        "connection.pat".into()
                    } else if key.as_str().eq_ignore_ascii_case(env_keys::ORGANIZATION) {
                        "connection.organization".into()
                    } else {
                        "connection.project".into()
                    }
                }),
        )
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/azwiki/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("azwiki"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from("azwiki.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path(config_file: Option<&Path>) {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = config_file
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::project_config_path);
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render the effective configuration (the token is never included)
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| WikiError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a commented project config template
    pub fn init_project(path: &Path, force: bool) -> Result<PathBuf> {
        if path.exists() && !force {
            return Err(WikiError::Config(format!(
                "{} already exists. Use --force to overwrite.",
                path.display()
            )));
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, Self::default_project_config())?;
        info!("Created project config: {}", path.display());

        Ok(path.to_path_buf())
    }

    /// Default project config content (TOML)
    fn default_project_config() -> String {
        r#"# azwiki configuration
# The personal access token is read from AZURE_DEVOPS_PAT (or AZWIKI_CONNECTION__PAT).

version = "1.0"

[connection]
api_base = "https://dev.azure.com"
# organization = "contoso"
# project = "Fabrikam"

[network]
timeout_secs = 60
connect_timeout_secs = 10

# Set max_retries above 0 to retry throttled, transient and network failures
[retry]
max_retries = 0
min_delay_ms = 500
max_delay_secs = 30
factor = 2.0
jitter = true

[export]
output_dir = "wikis"
isolate_failures = false
pretty = false
"#
        .to_string()
    }
}
