//! Core types for the dnsfilter hostname denylist.
//!
//! This crate holds the pieces shared by the filter engine and its front-ends:
//!
//! - **Zones**: [`Zone`], a blocked DNS suffix together with the matching rule
//! - **Errors**: the [`FilterError`] taxonomy reported by construction and refresh
//!
//! # Example
//!
//! ```rust
//! use dnsfilter_core::Zone;
//!
//! let zone = Zone::new("google.com").unwrap();
//! assert!(zone.matches("mail.google.com"));
//! assert!(!zone.matches("evilgoogle.com"));
//! ```

#![doc(html_root_url = "https://docs.rs/dnsfilter-core/0.3.0")]

mod error;
mod zone;

pub use error::{FilterError, Result};
pub use zone::{label_suffixes, Zone};
