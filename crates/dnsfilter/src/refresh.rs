//! Periodic blocklist refresh over HTTP.
//!
//! A worker fetches a newline-delimited zone list, feeds every record into
//! the [`ZoneStore`], sleeps for the configured interval and starts over.
//! Failures never stop the loop; they are handed to the error channel or,
//! when nobody is listening, logged and dropped.

use dnsfilter_core::{FilterError, Result};
use futures_util::StreamExt;
use reqwest::{Client as HttpClient, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::store::ZoneStore;

/// Longest record accepted from a blocklist source, newline excluded
pub(crate) const MAX_RECORD_LEN: usize = 64 * 1024;

// How much of a rejected record is echoed back in the error.
const RECORD_PREVIEW_LEN: usize = 64;

/// Non-blocking publisher for out-of-band errors
#[derive(Debug, Clone)]
pub(crate) struct ErrorReporter {
    tx: mpsc::Sender<FilterError>,
}

impl ErrorReporter {
    pub(crate) const fn new(tx: mpsc::Sender<FilterError>) -> Self {
        Self { tx }
    }

    /// Hand `err` to the channel, or log it when the channel cannot take it.
    pub(crate) fn report(&self, err: FilterError) {
        match self.tx.try_send(err) {
            Ok(()) => {}
            Err(TrySendError::Full(err) | TrySendError::Closed(err)) => {
                error!(error = %err, "dropping refresh error, no receiver ready");
            }
        }
    }
}

/// Fetch-and-apply loop for one blocklist source
#[derive(Debug)]
pub(crate) struct RefreshWorker {
    store: Arc<ZoneStore>,
    http: HttpClient,
    url: Url,
    interval: Duration,
    errors: ErrorReporter,
}

impl RefreshWorker {
    pub(crate) const fn new(
        store: Arc<ZoneStore>,
        http: HttpClient,
        url: Url,
        interval: Duration,
        errors: ErrorReporter,
    ) -> Self {
        Self {
            store,
            http,
            url,
            interval,
            errors,
        }
    }

    pub(crate) const fn url(&self) -> &Url {
        &self.url
    }

    pub(crate) const fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the loop on `runtime`; it runs until `cancel` fires.
    pub(crate) fn spawn(
        self: Arc<Self>,
        runtime: &Handle,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        runtime.spawn(self.run(cancel))
    }

    async fn run(self: Arc<Self>, cancel: CancellationToken) {
        info!(url = %self.url, interval = ?self.interval, "blocklist refresh started");

        loop {
            let pass = tokio::select! {
                () = cancel.cancelled() => break,
                pass = self.update_ranges() => pass,
            };

            if let Err(err) = pass {
                self.errors.report(err);
            }

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(url = %self.url, "blocklist refresh stopped");
    }

    /// One refresh pass. Returns how many zones were newly recorded.
    pub(crate) async fn update_ranges(&self) -> Result<usize> {
        debug!(url = %self.url, "fetching blocklist");

        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(url = %self.url, status = status.as_u16(), "blocklist source rejected request");
            return Err(FilterError::HttpRefreshStatus {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other));
        let mut reader = BufReader::new(StreamReader::new(stream));
        let mut buf = Vec::with_capacity(256);

        let mut added = 0;
        loop {
            buf.clear();
            let record = read_record(&mut reader, &mut buf)
                .await
                .map_err(|e| self.transport_error(&e))?;

            let line = match record {
                Record::End => break,
                Record::Oversized => {
                    self.errors.report(self.record_error(&buf, "record too long"));
                    continue;
                }
                Record::Line => match std::str::from_utf8(&buf) {
                    Ok(line) => line,
                    Err(_) => {
                        self.errors.report(self.record_error(&buf, "record is not valid UTF-8"));
                        continue;
                    }
                },
            };

            // Tolerates CRLF bodies and padded lines.
            let zone = line.trim();
            if zone.is_empty() {
                continue;
            }

            match self.store.add_zone(zone) {
                Ok(true) => added += 1,
                Ok(false) => {}
                Err(err) => self.errors.report(err),
            }
        }

        info!(
            url = %self.url,
            added,
            total = self.store.len(),
            "blocklist refreshed"
        );
        Ok(added)
    }

    fn record_error(&self, raw: &[u8], reason: &str) -> FilterError {
        let shown = &raw[..raw.len().min(RECORD_PREVIEW_LEN)];
        warn!(url = %self.url, reason, "skipping blocklist record");
        FilterError::InvalidZone {
            zone: String::from_utf8_lossy(shown).trim().to_owned(),
            reason: reason.to_owned(),
        }
    }

    fn transport_error(&self, err: &(dyn std::error::Error + 'static)) -> FilterError {
        FilterError::HttpRefreshTransport {
            url: self.url.to_string(),
            reason: error_chain(err),
        }
    }
}

enum Record {
    Line,
    Oversized,
    End,
}

/// Read one newline-terminated record into `buf`, newline included.
///
/// A record longer than [`MAX_RECORD_LEN`] is drained up to its newline and
/// reported as [`Record::Oversized`]; `buf` then holds its first bytes.
async fn read_record<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Record>
where
    R: AsyncBufRead + Unpin,
{
    let limit = MAX_RECORD_LEN as u64 + 1;
    if (&mut *reader).take(limit).read_until(b'\n', buf).await? == 0 {
        return Ok(Record::End);
    }
    if buf.len() <= MAX_RECORD_LEN || buf.ends_with(b"\n") {
        return Ok(Record::Line);
    }

    let mut rest = Vec::new();
    loop {
        rest.clear();
        let read = (&mut *reader).take(limit).read_until(b'\n', &mut rest).await?;
        if read == 0 || rest.ends_with(b"\n") {
            return Ok(Record::Oversized);
        }
    }
}

// reqwest keeps the interesting part (refused, reset, dns) in the source chain.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
