//! Hostname denylist with zone-suffix matching and periodic HTTP refresh.
//!
//! A [`DnsFilter`] answers whether a hostname falls under one of its blocked
//! zones: `google.com` blocks `google.com` and `mail.google.com`, but not
//! `evilgoogle.com`. Zones are seeded at construction and can be pulled
//! periodically from a newline-delimited list served over HTTP.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dnsfilter::{with_http_refresh, with_zones, DnsFilter};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> dnsfilter::Result<()> {
//!     let filter = DnsFilter::new([
//!         with_zones(["doubleclick.net"]),
//!         with_http_refresh("https://lists.example/zones.txt", Duration::from_secs(3600)),
//!     ])?;
//!
//!     let mut errors = filter.take_errors().expect("first call");
//!     tokio::spawn(async move {
//!         while let Some(err) = errors.recv().await {
//!             eprintln!("refresh failed: {err}");
//!         }
//!     });
//!
//!     assert!(filter.is_blocked("ad.doubleclick.net"));
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/dnsfilter/0.3.0")]

pub mod config;
mod filter;
mod refresh;
mod store;

pub use config::{FilterConfig, FilterSettings, RefreshConfig};
pub use dnsfilter_core::{FilterError, Result, Zone};
pub use filter::{with_http_refresh, with_zones, DnsFilter, DnsFilterBuilder, FilterOption};
pub use store::ZoneStore;

// Re-export runtime for convenience
pub use tokio;
