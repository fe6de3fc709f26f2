//! `dnsfilter check` - verdict per hostname.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::Context;
use crate::cli::args::CheckArgs;
use crate::output::OutputFormat;

#[derive(Debug, Serialize)]
struct Verdict<'a> {
    hostname: &'a str,
    blocked: bool,
}

pub async fn execute(ctx: Context, args: CheckArgs) -> Result<()> {
    let filter = ctx.filter()?;

    // No background loop for a one-shot check, just a single pass.
    filter.shutdown().await;
    if ctx.has_refresh() {
        let added = filter.refresh_now().await?;
        tracing::debug!(added, "blocklist fetched");
    }

    let verdicts: Vec<_> = args
        .hostnames
        .iter()
        .map(|hostname| Verdict {
            hostname,
            blocked: filter.is_blocked(hostname),
        })
        .collect();

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&verdicts)?);
        }
        OutputFormat::Pretty => {
            for verdict in &verdicts {
                let label = if verdict.blocked {
                    "blocked".red().bold()
                } else {
                    "allowed".green()
                };
                println!("{label}  {}", verdict.hostname);
            }
        }
    }

    Ok(())
}
