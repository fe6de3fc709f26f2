//! Filter settings and file-based configuration.

use dnsfilter_core::{FilterError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default timeout for a single blocklist fetch
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default refresh interval used by file configuration
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3600);

/// Default depth of the refresh error channel
pub const DEFAULT_ERROR_BUFFER: usize = 1;

/// Runtime knobs that are not part of the option list
#[derive(Debug, Clone)]
pub struct FilterSettings {
    /// Timeout applied to each blocklist fetch
    pub timeout: Duration,

    /// User-Agent sent to the blocklist source
    pub user_agent: String,

    /// Capacity of the error channel (at least 1)
    pub error_buffer: usize,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
            error_buffer: DEFAULT_ERROR_BUFFER,
        }
    }
}

impl FilterSettings {
    /// Set the fetch timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set the error channel capacity
    #[must_use]
    pub const fn error_buffer(mut self, capacity: usize) -> Self {
        self.error_buffer = capacity;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.error_buffer == 0 {
            return Err(FilterError::Config(
                "error buffer must hold at least one error".into(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(FilterError::Config("fetch timeout must be non-zero".into()));
        }
        Ok(())
    }
}

/// Filter configuration as read from a TOML file.
///
/// ```toml
/// zones = ["ads.example", "tracker.example"]
/// error_buffer = 4
///
/// [refresh]
/// url = "https://lists.example/zones.txt"
/// interval_secs = 3600
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Seed zones
    #[serde(default)]
    pub zones: Vec<String>,

    /// Periodic HTTP refresh, disabled when absent
    #[serde(default)]
    pub refresh: Option<RefreshConfig>,

    /// Capacity of the error channel
    #[serde(default = "default_error_buffer")]
    pub error_buffer: usize,
}

/// The `[refresh]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshConfig {
    /// Blocklist source
    pub url: String,

    /// Seconds between two refresh passes
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Per-fetch timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl RefreshConfig {
    /// Refresh interval as a duration
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            refresh: None,
            error_buffer: default_error_buffer(),
        }
    }
}

impl FilterConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| FilterError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| FilterError::Config(e.to_string()))
    }

    /// Settings implied by this configuration
    #[must_use]
    pub fn settings(&self) -> FilterSettings {
        let mut settings = FilterSettings::default().error_buffer(self.error_buffer);
        if let Some(refresh) = &self.refresh {
            settings = settings.timeout(Duration::from_secs(refresh.timeout_secs));
            if let Some(agent) = &refresh.user_agent {
                settings = settings.user_agent(agent.clone());
            }
        }
        settings
    }
}

fn default_user_agent() -> String {
    format!("dnsfilter/{}", env!("CARGO_PKG_VERSION"))
}

const fn default_error_buffer() -> usize {
    DEFAULT_ERROR_BUFFER
}

const fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL.as_secs()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}
