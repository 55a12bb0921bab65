//! fluxit CLI - Scaffold Flux GitOps applications from Jinja2 templates

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;
mod error;
mod exit_codes;
mod logging;
mod prompt;

use commands::init_templates::InitTemplatesArgs;
use commands::namespaces::NamespacesArgs;
use commands::new::NewArgs;
use error::Result;
use fluxit_core::FluxitConfig;

#[derive(Parser)]
#[command(name = "fluxit")]
#[command(version)]
#[command(about = "Scaffold Flux GitOps application manifests from templates", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file [default: .fluxit.yaml, then the user config dir]
    #[arg(long, global = true, env = "FLUXIT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(
        long,
        global = true,
        env = "FLUXIT_LOG_LEVEL",
        value_parser = ["error", "warn", "info", "debug", "trace"],
        ignore_case = true
    )]
    log_level: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the manifests of a new application
    New(NewArgs),

    /// List namespaces found in the apps directory
    Namespaces(NamespacesArgs),

    /// Write the bundled template set so it can be customised
    InitTemplates(InitTemplatesArgs),
}

fn main() {
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also land here
            let code = if e.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = FluxitConfig::load(cli.config.as_deref())?;

    let color = !cli.no_color && config.color;
    if !color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    logging::init(level, color)?;
    tracing::debug!("Starting fluxit {}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::New(args) => commands::new::run(args, &config),
        Commands::Namespaces(args) => commands::namespaces::run(args, &config),
        Commands::InitTemplates(args) => commands::init_templates::run(args, &config),
    }
}
