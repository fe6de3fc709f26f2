//! The user-facing filter: construction options, builder and shared handle.

use dnsfilter_core::{FilterError, Result};
use reqwest::Client as HttpClient;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::config::{FilterConfig, FilterSettings};
use crate::refresh::{ErrorReporter, RefreshWorker};
use crate::store::ZoneStore;

/// A construction step applied to a new [`DnsFilter`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOption {
    /// Seed the denylist
    Zones(Vec<String>),

    /// Pull zones from `url` every `interval`, starting immediately
    HttpRefresh {
        /// Blocklist source
        url: String,
        /// Pause between two passes
        interval: Duration,
    },
}

/// Seed the denylist with `zones`
pub fn with_zones<I, S>(zones: I) -> FilterOption
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    FilterOption::Zones(zones.into_iter().map(Into::into).collect())
}

/// Refresh the denylist from `url` every `interval`
pub fn with_http_refresh(url: impl Into<String>, interval: Duration) -> FilterOption {
    FilterOption::HttpRefresh {
        url: url.into(),
        interval,
    }
}

/// Hostname denylist with optional periodic HTTP refresh.
///
/// Cloning is cheap and every clone shares the same denylist. The refresh
/// worker stops on [`DnsFilter::shutdown`] or once the last clone is dropped.
///
/// ```rust
/// use dnsfilter::{with_zones, DnsFilter};
///
/// let filter = DnsFilter::new([with_zones(["google.com"])]).unwrap();
/// assert!(filter.is_blocked("mail.google.com"));
/// assert!(filter.is_hostname_allowed("lesoir.be"));
/// ```
#[derive(Debug, Clone)]
pub struct DnsFilter {
    inner: Arc<FilterInner>,
}

#[derive(Debug)]
struct FilterInner {
    store: Arc<ZoneStore>,
    settings: FilterSettings,
    errors: ErrorReporter,
    error_rx: Mutex<Option<mpsc::Receiver<FilterError>>>,
    refresh: Option<Refresh>,
    cancel: CancellationToken,
}

#[derive(Debug)]
struct Refresh {
    worker: Arc<RefreshWorker>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for FilterInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl FilterInner {
    fn new(settings: FilterSettings) -> Result<Self> {
        settings.validate()?;
        let (tx, rx) = mpsc::channel(settings.error_buffer);

        Ok(Self {
            store: Arc::new(ZoneStore::new()),
            settings,
            errors: ErrorReporter::new(tx),
            error_rx: Mutex::new(Some(rx)),
            refresh: None,
            cancel: CancellationToken::new(),
        })
    }

    fn apply(&mut self, option: FilterOption) -> Result<()> {
        match option {
            FilterOption::Zones(zones) => self.store.add_zones(&zones),
            FilterOption::HttpRefresh { url, interval } => self.enable_refresh(&url, interval),
        }
    }

    fn enable_refresh(&mut self, url: &str, interval: Duration) -> Result<()> {
        if self.refresh.is_some() {
            return Err(FilterError::Config(
                "http refresh is already configured".into(),
            ));
        }
        if interval.is_zero() {
            return Err(FilterError::Config(
                "refresh interval must be non-zero".into(),
            ));
        }

        let url = parse_refresh_url(url)?;
        let runtime = Handle::try_current().map_err(|_| FilterError::NoRuntime)?;

        let http = HttpClient::builder()
            .timeout(self.settings.timeout)
            .user_agent(&self.settings.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| FilterError::Config(format!("failed to build HTTP client: {e}")))?;

        let worker = Arc::new(RefreshWorker::new(
            Arc::clone(&self.store),
            http,
            url,
            interval,
            self.errors.clone(),
        ));
        let task = Arc::clone(&worker).spawn(&runtime, self.cancel.clone());

        self.refresh = Some(Refresh {
            worker,
            task: Mutex::new(Some(task)),
        });
        Ok(())
    }
}

fn parse_refresh_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| FilterError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(FilterError::InvalidUrl(format!(
            "{raw}: unsupported scheme {scheme:?}"
        ))),
    }
}

impl DnsFilter {
    /// Build a filter by applying `options` in order.
    ///
    /// The first failing option aborts construction. A refresh worker
    /// started by an earlier option is stopped again in that case.
    pub fn new(options: impl IntoIterator<Item = FilterOption>) -> Result<Self> {
        Self::with_settings(FilterSettings::default(), options)
    }

    /// Like [`DnsFilter::new`] with explicit settings
    pub fn with_settings(
        settings: FilterSettings,
        options: impl IntoIterator<Item = FilterOption>,
    ) -> Result<Self> {
        let mut inner = FilterInner::new(settings)?;
        for option in options {
            inner.apply(option)?;
        }

        debug!(zones = inner.store.len(), "dns filter ready");
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Build a filter from file configuration
    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        let mut options = vec![with_zones(config.zones.iter().cloned())];
        if let Some(refresh) = &config.refresh {
            options.push(with_http_refresh(refresh.url.clone(), refresh.interval()));
        }
        Self::with_settings(config.settings(), options)
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> DnsFilterBuilder {
        DnsFilterBuilder::new()
    }

    /// Block `zone` and all of its subdomains.
    ///
    /// Adding a zone that is already covered by a stored zone is a no-op.
    pub fn add_zone(&self, zone: &str) -> Result<()> {
        self.inner.store.add_zone(zone).map(|_| ())
    }

    /// Add each zone in turn, stopping at the first failure
    pub fn add_zones<I, S>(&self, zones: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner.store.add_zones(zones)
    }

    /// Whether `hostname` is a stored zone or one of its subdomains
    pub fn is_blocked(&self, hostname: &str) -> bool {
        self.inner.store.is_blocked(hostname)
    }

    /// Inverse of [`DnsFilter::is_blocked`]
    pub fn is_hostname_allowed(&self, hostname: &str) -> bool {
        !self.is_blocked(hostname)
    }

    /// Stored zones in insertion order
    pub fn zones(&self) -> Vec<String> {
        self.inner.store.zones()
    }

    /// Number of stored zones
    pub fn len(&self) -> usize {
        self.inner.store.len()
    }

    /// Whether the denylist is empty
    pub fn is_empty(&self) -> bool {
        self.inner.store.is_empty()
    }

    /// Take the receiving end of the refresh error channel.
    ///
    /// Returns `None` after the first call. Errors are dropped (and logged)
    /// whenever the channel is full, so a consumer that wants every error
    /// should keep polling the receiver.
    pub fn take_errors(&self) -> Option<mpsc::Receiver<FilterError>> {
        self.inner
            .error_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Configured blocklist source, if any
    pub fn refresh_url(&self) -> Option<&Url> {
        self.inner.refresh.as_ref().map(|r| r.worker.url())
    }

    /// Configured refresh interval, if any
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.inner.refresh.as_ref().map(|r| r.worker.interval())
    }

    /// Run one refresh pass now, outside the periodic schedule.
    ///
    /// Returns the number of zones newly recorded. Errors are returned to
    /// the caller rather than sent on the error channel.
    pub async fn refresh_now(&self) -> Result<usize> {
        let refresh = self
            .inner
            .refresh
            .as_ref()
            .ok_or_else(|| FilterError::Config("http refresh is not configured".into()))?;
        refresh.worker.update_ranges().await
    }

    /// Whether a refresh worker is currently running
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.as_ref().is_some_and(|r| {
            r.task
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .as_ref()
                .is_some_and(|task| !task.is_finished())
        })
    }

    /// Stop the refresh worker and wait for it to exit.
    ///
    /// Zones already recorded stay in place. Calling this without a worker,
    /// or more than once, does nothing.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let task = self.inner.refresh.as_ref().and_then(|r| {
            r.task
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
        });

        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "refresh worker ended abnormally");
            }
        }
    }
}

/// Builder for configuring a [`DnsFilter`]
#[derive(Debug, Default)]
pub struct DnsFilterBuilder {
    options: Vec<FilterOption>,
    settings: FilterSettings,
}

impl DnsFilterBuilder {
    /// Create a builder with default settings and no options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary option
    #[must_use]
    pub fn option(mut self, option: FilterOption) -> Self {
        self.options.push(option);
        self
    }

    /// Seed one zone
    #[must_use]
    pub fn zone(self, zone: impl Into<String>) -> Self {
        self.option(FilterOption::Zones(vec![zone.into()]))
    }

    /// Seed several zones
    #[must_use]
    pub fn zones<I, S>(self, zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.option(with_zones(zones))
    }

    /// Enable periodic HTTP refresh
    #[must_use]
    pub fn http_refresh(self, url: impl Into<String>, interval: Duration) -> Self {
        self.option(with_http_refresh(url, interval))
    }

    /// Set the per-fetch timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings = self.settings.timeout(timeout);
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.settings = self.settings.user_agent(agent);
        self
    }

    /// Set the error channel capacity
    #[must_use]
    pub fn error_buffer(mut self, capacity: usize) -> Self {
        self.settings = self.settings.error_buffer(capacity);
        self
    }

    /// Build the filter
    pub fn build(self) -> Result<DnsFilter> {
        DnsFilter::with_settings(self.settings, self.options)
    }
}
