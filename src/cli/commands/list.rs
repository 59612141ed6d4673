//! List Command
//!
//! Print the wikis of the project, one name per line.

use crate::cli::{CommandContext, OutputFormat};
use crate::client::WikiApi;
use crate::types::Result;

pub async fn run(ctx: &CommandContext, format: OutputFormat) -> Result<()> {
    let wikis = ctx.client()?.list_wikis().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&wikis)?),
        OutputFormat::Text => {
            for wiki in &wikis {
                println!("{}", wiki.identifier());
            }
        }
    }
    Ok(())
}
