//! Export Command
//!
//! Write one `<wiki>.json` per wiki of the project.
//!
//! Usage:
//!   azwiki export [-o DIR] [--isolate-failures] [--wiki NAME]... [--max-concurrency N]
//!                 [--pretty] [-f text|json]

use std::path::PathBuf;

use crate::cli::{CommandContext, OutputFormat};
use crate::cli::ui::Output;
use crate::export::{ExportOptions, ExportReport, WikiExporter};
use crate::types::Result;

/// Command-line adjustments on top of the `[export]` config section
#[derive(Debug, Clone, Default)]
pub struct ExportArgs {
    pub output: Option<PathBuf>,
    pub isolate_failures: bool,
    pub wikis: Vec<String>,
    pub max_concurrency: Option<usize>,
    pub pretty: bool,
    /// `json` prints the report on stdout
    pub format: OutputFormat,
}

impl ExportArgs {
    fn options(&self, ctx: &CommandContext) -> ExportOptions {
        let mut options =
            ExportOptions::from_config(&ctx.config.export).with_only(self.wikis.clone());
        if let Some(dir) = &self.output {
            options = options.with_output_dir(dir.clone());
        }
        if self.isolate_failures {
            options = options.with_isolated_failures(true);
        }
        if self.max_concurrency.is_some() {
            options = options.with_max_concurrency(self.max_concurrency);
        }
        options.pretty |= self.pretty;
        options
    }
}

pub async fn run(ctx: &CommandContext, args: ExportArgs, output: &Output) -> Result<ExportReport> {
    let options = args.options(ctx);
    let format = args.format;
    output.info(&format!(
        "Exporting wikis to {}",
        options.output_dir.display()
    ));

    let exporter = WikiExporter::new(ctx.api()?, options);
    let report = exporter.export_all().await?;

    output.report(&report);
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(report)
}
