//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Check hostnames against a denylist of DNS zones
///
/// A zone blocks itself and every subdomain: `--zone google.com` blocks
/// `mail.google.com` but not `evilgoogle.com`.
#[derive(Parser, Debug)]
#[command(name = "dnsfilter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "DNSFILTER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where blocked zones come from; merged on top of the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Blocked zone (repeatable)
    #[arg(short, long = "zone", global = true)]
    pub zones: Vec<String>,

    /// URL of a newline-delimited zone list
    #[arg(long, global = true)]
    pub refresh_url: Option<String>,

    /// Seconds between two refreshes
    #[arg(long, global = true)]
    pub interval: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a verdict for each hostname
    Check(CheckArgs),

    /// Keep the blocklist refreshed and report failures until Ctrl-C
    Watch,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Hostnames to check
    #[arg(required = true)]
    pub hostnames: Vec<String>,
}
