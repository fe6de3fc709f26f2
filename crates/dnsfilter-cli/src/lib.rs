//! # dnsfilter-cli
//!
//! Command-line front-end for the `dnsfilter` hostname denylist.
//!
//! ## Features
//!
//! - **check**: print a blocked/allowed verdict for each hostname
//! - **watch**: keep a blocklist refreshed and report refresh failures
//! - **Configuration**: TOML file plus command-line overrides
//! - **Output formats**: pretty text or JSON

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
