//! `dnsfilter watch` - keep a blocklist refreshed and surface failures.

use anyhow::{Context as _, Result};
use colored::Colorize;
use serde_json::json;

use super::Context;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context) -> Result<()> {
    ctx.require_refresh()?;

    let filter = ctx.filter()?;
    let mut errors = filter
        .take_errors()
        .context("refresh error channel already taken")?;

    if let Some(url) = filter.refresh_url() {
        eprintln!("{} {}", "Watching".bold(), url.as_str().cyan());
    }

    loop {
        tokio::select! {
            received = errors.recv() => {
                let Some(err) = received else { break };
                match ctx.output_format {
                    OutputFormat::Json => println!(
                        "{}",
                        json!({ "error": err.to_string(), "zones": filter.len() })
                    ),
                    OutputFormat::Pretty => {
                        println!("{} {err}", "refresh failed:".red().bold());
                    }
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    filter.shutdown().await;

    match ctx.output_format {
        OutputFormat::Json => println!("{}", json!({ "zones": filter.len() })),
        OutputFormat::Pretty => println!("{} zones blocked", filter.len().to_string().bold()),
    }

    Ok(())
}
