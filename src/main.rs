use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use azwiki::cli::commands::export::ExportArgs;
use azwiki::cli::ui::Output;
use azwiki::cli::{CommandContext, ConnectionOverrides, OutputFormat, runtime};

#[derive(Parser)]
#[command(name = "azwiki")]
#[command(version, about = "Export Azure DevOps project wikis to JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Config file (default: ./azwiki.toml)")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Azure DevOps organization")]
    organization: Option<String>,

    #[arg(long, global = true, help = "Azure DevOps project")]
    project: Option<String>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every wiki of the project to <output>/<wiki>.json
    Export(ExportCommand),

    /// List the wikis of the project
    List {
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the flattened page paths of one wiki
    Pages {
        #[arg(help = "Wiki name")]
        wiki: String,
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct ExportCommand {
    #[arg(long, short, help = "Output directory (default: ./wikis)")]
    output: Option<PathBuf>,
    #[arg(long, help = "Keep exporting the other wikis when one fails")]
    isolate_failures: bool,
    #[arg(long = "wiki", value_name = "NAME", help = "Export only this wiki (repeatable)")]
    wikis: Vec<String>,
    #[arg(long, help = "Maximum page requests in flight per wiki")]
    max_concurrency: Option<usize>,
    #[arg(long, help = "Pretty-print the output files")]
    pretty: bool,
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text, help = "Report format")]
    format: OutputFormat,
}

impl From<ExportCommand> for ExportArgs {
    fn from(cmd: ExportCommand) -> Self {
        Self {
            output: cmd.output,
            isolate_failures: cmd.isolate_failures,
            wikis: cmd.wikis,
            max_concurrency: cmd.max_concurrency,
            pretty: cmd.pretty,
            format: cmd.format,
        }
    }
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show configuration file paths
    Path,
    /// Create a project config file
    Init {
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mazwiki encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // A missing .env is fine; real environment variables still apply
    dotenvy::dotenv().ok();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let output = Output::quiet(cli.quiet);
    let config_file = cli.config.as_deref();
    let overrides = ConnectionOverrides {
        organization: cli.organization,
        project: cli.project,
    };

    match cli.command {
        Commands::Export(cmd) => {
            let ctx = CommandContext::load(config_file, &overrides)?;
            let report = runtime()?.block_on(azwiki::cli::commands::export::run(
                &ctx,
                cmd.into(),
                &output,
            ))?;
            if !report.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::List { format } => {
            let ctx = CommandContext::load(config_file, &overrides)?;
            runtime()?.block_on(azwiki::cli::commands::list::run(&ctx, format))?;
        }
        Commands::Pages { wiki, format } => {
            let ctx = CommandContext::load(config_file, &overrides)?;
            runtime()?.block_on(azwiki::cli::commands::pages::run(&ctx, &wiki, format))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                let ctx = CommandContext::load(config_file, &overrides)?;
                azwiki::cli::commands::config::show(&ctx, format)?;
            }
            ConfigAction::Path => {
                azwiki::cli::commands::config::path(config_file)?;
            }
            ConfigAction::Init { force } => {
                azwiki::cli::commands::config::init(config_file, force, &output)?;
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
