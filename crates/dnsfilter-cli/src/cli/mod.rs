//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;

use crate::config::Config;
use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration, then let flags override it
    let config = Config::load(cli.config.as_deref())?.merge(cli.source);

    let ctx = commands::Context {
        filter: config.into_filter_config(),
        output_format: cli.output.unwrap_or(OutputFormat::Pretty),
    };

    match cli.command {
        Commands::Check(args) => commands::check::execute(ctx, args).await,
        Commands::Watch => commands::watch::execute(ctx).await,
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn setup_logging(verbose: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "warn" };
        tracing_subscriber::EnvFilter::new(level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
