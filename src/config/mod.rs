//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/azwiki/config.toml)
//! 3. Project config (./azwiki.toml)
//! 4. Environment variables (AZWIKI_*, AZURE_DEVOPS_PAT, ORGANIZATION, PROJECT)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
