//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use dnsfilter::{FilterConfig, RefreshConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::args::SourceArgs;

/// Default seconds between refreshes when only a URL is given.
const DEFAULT_INTERVAL_SECS: u64 = 3600;

/// CLI configuration: the filter file plus command-line overrides.
#[derive(Debug, Clone, Default)]
pub struct Config {
    filter: FilterConfig,
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("rs", "dnsfilter", "dnsfilter")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let filter = FilterConfig::load(&path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        Ok(Self { filter })
    }

    /// Apply command-line sources on top of the file.
    #[must_use]
    pub fn merge(mut self, args: SourceArgs) -> Self {
        self.filter.zones.extend(args.zones);

        if let Some(url) = args.refresh_url {
            let refresh = self.filter.refresh.get_or_insert_with(|| RefreshConfig {
                url: String::new(),
                interval_secs: DEFAULT_INTERVAL_SECS,
                timeout_secs: dnsfilter::config::DEFAULT_TIMEOUT.as_secs(),
                user_agent: None,
            });
            refresh.url = url;
        }

        if let (Some(secs), Some(refresh)) = (args.interval, self.filter.refresh.as_mut()) {
            refresh.interval_secs = secs;
        }

        self
    }

    /// Refresh interval, if a source is configured.
    pub fn interval(&self) -> Option<Duration> {
        self.filter.refresh.as_ref().map(RefreshConfig::interval)
    }

    /// The filter configuration to build from.
    #[must_use]
    pub fn into_filter_config(self) -> FilterConfig {
        self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_extend_file_zones() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "zones = [\"file.test\"]").unwrap();

        let config = Config::load(Some(tmpfile.path())).unwrap().merge(SourceArgs {
            zones: vec!["flag.test".into()],
            ..SourceArgs::default()
        });

        assert_eq!(config.into_filter_config().zones, vec!["file.test", "flag.test"]);
    }

    #[test]
    fn test_refresh_url_flag_overrides_file() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmpfile,
            "[refresh]\nurl = \"http://file.test/zones.txt\"\ninterval_secs = 60\n"
        )
        .unwrap();

        let config = Config::load(Some(tmpfile.path())).unwrap().merge(SourceArgs {
            refresh_url: Some("http://flag.test/zones.txt".into()),
            ..SourceArgs::default()
        });

        assert_eq!(config.interval(), Some(Duration::from_secs(60)));
        let refresh = config.into_filter_config().refresh.unwrap();
        assert_eq!(refresh.url, "http://flag.test/zones.txt");
    }

    #[test]
    fn test_interval_without_url_is_ignored() {
        let config = Config::default().merge(SourceArgs {
            interval: Some(5),
            ..SourceArgs::default()
        });
        assert_eq!(config.interval(), None);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        assert!(Config::load(Some(Path::new("/nonexistent/dnsfilter.toml"))).is_err());
    }
}
