//! Command implementations.

pub mod check;
pub mod watch;

use dnsfilter::{DnsFilter, FilterConfig};

use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Effective filter configuration
    pub filter: FilterConfig,

    /// Output format
    pub output_format: OutputFormat,
}

impl Context {
    /// Whether a blocklist source is configured
    pub fn has_refresh(&self) -> bool {
        self.filter.refresh.is_some()
    }

    /// Require a blocklist source, explaining how to set one.
    pub fn require_refresh(&self) -> anyhow::Result<()> {
        if self.has_refresh() {
            return Ok(());
        }
        anyhow::bail!(
            "A blocklist URL is required.\n\n\
             Set it with one of:\n  \
             1. --refresh-url <URL>\n  \
             2. [refresh] url = \"...\" in the config file"
        )
    }

    /// Build the filter described by the configuration.
    pub fn filter(&self) -> anyhow::Result<DnsFilter> {
        Ok(DnsFilter::from_config(&self.filter)?)
    }
}
