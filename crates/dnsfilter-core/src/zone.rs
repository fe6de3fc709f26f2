//! Blocked DNS zones and the suffix matching rule.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::error::{FilterError, Result};

/// A blocked DNS zone such as `example.com`.
///
/// A zone blocks itself and every strict subdomain, and nothing else: the
/// hostname must either equal the zone or end with `"." + zone`. Zones are
/// stored verbatim and compared byte for byte, so `Example.com` and
/// `example.com` are different zones. Callers are expected to hand in
/// lowercase ASCII (punycode for internationalised labels) for both zones
/// and queried hostnames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Zone(Box<str>);

impl Zone {
    /// Create a zone, rejecting the empty string.
    pub fn new(zone: impl Into<String>) -> Result<Self> {
        let zone = zone.into();
        if zone.is_empty() {
            return Err(FilterError::InvalidZone {
                zone,
                reason: "zone must not be empty".into(),
            });
        }
        Ok(Self(zone.into_boxed_str()))
    }

    /// The zone as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `hostname` is this zone or lies beneath it.
    #[must_use]
    pub fn matches(&self, hostname: &str) -> bool {
        let zone = self.as_str();
        if hostname == zone {
            return true;
        }
        hostname
            .strip_suffix(zone)
            .is_some_and(|head| head.ends_with('.'))
    }
}

/// Every suffix of `hostname` that starts on a label boundary, longest first.
///
/// `a.b.c` yields `a.b.c`, `b.c`, `c`. A hostname matches a zone exactly when
/// one of these suffixes equals the zone, which lets a hash index answer
/// [`Zone::matches`] for a whole denylist in one pass over the hostname.
pub fn label_suffixes(hostname: &str) -> impl Iterator<Item = &str> {
    std::iter::once(hostname).chain(
        hostname
            .char_indices()
            .filter(|&(_, c)| c == '.')
            .map(move |(idx, _)| &hostname[idx + 1..]),
    )
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Zone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Zone {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Zone {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Zone {
    type Error = FilterError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Zone> for String {
    fn from(zone: Zone) -> Self {
        zone.0.into_string()
    }
}
