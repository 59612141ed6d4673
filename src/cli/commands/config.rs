//! Config Command
//!
//! Inspect and create azwiki configuration.
//!
//! Usage:
//!   azwiki config show [-f json]
//!   azwiki config path
//!   azwiki config init [--force]

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::{CommandContext, OutputFormat};
use crate::config::ConfigLoader;
use crate::types::Result;

/// Print the merged effective configuration (the token is never shown)
pub fn show(ctx: &CommandContext, format: OutputFormat) -> Result<()> {
    let rendered = ConfigLoader::render(&ctx.config, format == OutputFormat::Json)?;
    println!("{}", rendered.trim_end());

    let token = if ctx.config.connection.pat.is_some() {
        "set"
    } else {
        "not set"
    };
    eprintln!("# personal access token: {}", token);
    Ok(())
}

/// Show configuration paths
pub fn path(config_file: Option<&Path>) -> Result<()> {
    ConfigLoader::show_path(config_file);
    Ok(())
}

/// Write a project config template
pub fn init(config_file: Option<&Path>, force: bool, output: &Output) -> Result<()> {
    let target = config_file
        .map(Path::to_path_buf)
        .unwrap_or_else(ConfigLoader::project_config_path);

    let path = ConfigLoader::init_project(&target, force)?;
    output.success("Initialized project configuration");
    println!("  Config: {}", path.display());
    Ok(())
}
