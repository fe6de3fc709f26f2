//! dnsfilter - check hostnames against a zone denylist
//!
//! A small front-end over the `dnsfilter` library.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dnsfilter_cli::run().await
}
