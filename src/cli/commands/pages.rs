//! Pages Command
//!
//! Print the flattened page paths of one wiki without fetching contents.

use std::sync::Arc;

use crate::cli::{CommandContext, OutputFormat};
use crate::export::{ExportOptions, WikiExporter};
use crate::types::Result;

pub async fn run(ctx: &CommandContext, wiki: &str, format: OutputFormat) -> Result<()> {
    let exporter = WikiExporter::new(Arc::new(ctx.client()?), ExportOptions::default());
    let paths = exporter.page_paths(wiki).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&paths)?),
        OutputFormat::Text => {
            for path in &paths {
                println!("{}", path);
            }
        }
    }
    Ok(())
}
