//! In-memory denylist guarded by a reader-writer lock.

use dnsfilter_core::{label_suffixes, Result, Zone};
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

/// Zones in insertion order plus a hash index over the same zones.
#[derive(Debug, Default)]
struct Denylist {
    ordered: Vec<Zone>,
    index: HashSet<Zone>,
}

impl Denylist {
    fn covers(&self, hostname: &str) -> bool {
        label_suffixes(hostname).any(|suffix| self.index.contains(suffix))
    }
}

/// Append-only set of blocked zones.
///
/// Queries take the shared lock and may run in parallel with each other.
/// Additions take the exclusive lock only for the append itself, so a query
/// observes either the state before or after any given addition.
#[derive(Debug, Default)]
pub struct ZoneStore {
    denylist: RwLock<Denylist>,
}

impl ZoneStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `zone` as blocked.
    ///
    /// Returns `Ok(false)` without touching the list when the zone is already
    /// covered, either by itself or by a parent zone.
    pub fn add_zone(&self, zone: &str) -> Result<bool> {
        let zone = Zone::new(zone)?;

        if self.is_blocked(zone.as_str()) {
            return Ok(false);
        }

        let mut list = self.write();
        // Another writer may have slipped in between the two locks.
        if list.covers(zone.as_str()) {
            return Ok(false);
        }

        info!(zone = %zone, "adding {zone} in blocklist");
        list.index.insert(zone.clone());
        list.ordered.push(zone);
        Ok(true)
    }

    /// Add each zone in turn, stopping at the first failure.
    pub fn add_zones<I, S>(&self, zones: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for zone in zones {
            self.add_zone(zone.as_ref())?;
        }
        Ok(())
    }

    /// Whether `hostname` equals a stored zone or is a subdomain of one.
    pub fn is_blocked(&self, hostname: &str) -> bool {
        self.read().covers(hostname)
    }

    /// Snapshot of the stored zones in insertion order.
    pub fn zones(&self) -> Vec<String> {
        self.read()
            .ordered
            .iter()
            .map(|zone| zone.as_str().to_owned())
            .collect()
    }

    /// Number of stored zones
    pub fn len(&self) -> usize {
        self.read().ordered.len()
    }

    /// Whether no zone has been stored yet
    pub fn is_empty(&self) -> bool {
        self.read().ordered.is_empty()
    }

    // The list is only ever appended to under the write guard, so a panic
    // elsewhere cannot leave it half-updated.
    fn read(&self) -> RwLockReadGuard<'_, Denylist> {
        self.denylist.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Denylist> {
        self.denylist.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn seeded() -> ZoneStore {
        let store = ZoneStore::new();
        store.add_zones(["google.com"]).unwrap();
        store
            .add_zones(["google.be", "google.fr", "test.google.com"])
            .unwrap();
        store
    }

    #[test]
    fn test_child_zone_is_absorbed() {
        let store = seeded();
        assert_eq!(store.zones(), vec!["google.com", "google.be", "google.fr"]);
    }

    #[test]
    fn test_seed_queries() {
        let store = seeded();
        assert!(!store.is_blocked("google.co.uk"));
        assert!(!store.is_blocked("lesoir.be"));
        assert!(store.is_blocked("google.com"));
        assert!(store.is_blocked("google.fr"));
        assert!(store.is_blocked("test.google.fr"));
    }

    #[test]
    fn test_label_boundary() {
        let store = ZoneStore::new();
        assert_ok!(store.add_zone("google.com"));
        assert!(!store.is_blocked("evilgoogle.com"));
        assert!(store.is_blocked("mail.google.com"));
        assert!(store.is_blocked("deep.mail.google.com"));
    }

    #[test]
    fn test_empty_store_blocks_nothing() {
        let store = ZoneStore::new();
        assert!(store.is_empty());
        assert!(!store.is_blocked("example.com"));
        assert!(!store.is_blocked(""));
    }

    #[test]
    fn test_add_zone_is_idempotent() {
        let store = ZoneStore::new();
        assert!(store.add_zone("example.com").unwrap());
        assert!(!store.add_zone("example.com").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_parent_after_child_keeps_both() {
        let store = ZoneStore::new();
        store.add_zone("sub.example.com").unwrap();
        store.add_zone("example.com").unwrap();
        assert_eq!(store.zones(), vec!["sub.example.com", "example.com"]);
        assert!(store.is_blocked("other.example.com"));
    }

    #[test]
    fn test_empty_zone_rejected() {
        let store = ZoneStore::new();
        assert_err!(store.add_zone(""));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_zones_stops_at_first_error() {
        let store = ZoneStore::new();
        assert_err!(store.add_zones(["a.test", "", "b.test"]));
        assert_eq!(store.zones(), vec!["a.test"]);
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        const ZONES: usize = 200;
        const READERS: usize = 8;

        let store = Arc::new(ZoneStore::new());
        let done = Arc::new(AtomicBool::new(false));

        std::thread::scope(|scope| {
            for _ in 0..READERS {
                let store = Arc::clone(&store);
                let done = Arc::clone(&done);
                scope.spawn(move || {
                    let mut seen = vec![false; ZONES];
                    while !done.load(Ordering::Acquire) {
                        for (i, was_seen) in seen.iter_mut().enumerate() {
                            let blocked = store.is_blocked(&format!("host.z{i}.test"));
                            // Once blocked, always blocked.
                            assert!(blocked || !*was_seen, "zone z{i}.test disappeared");
                            *was_seen |= blocked;
                        }
                    }
                });
            }

            for i in 0..ZONES {
                store.add_zone(&format!("z{i}.test")).unwrap();
            }
            done.store(true, Ordering::Release);
        });

        assert_eq!(store.len(), ZONES);
        for i in 0..ZONES {
            assert!(store.is_blocked(&format!("z{i}.test")));
        }
    }

    #[test]
    fn test_racing_writers_do_not_duplicate() {
        let store = Arc::new(ZoneStore::new());
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for i in 0..50 {
                        store.add_zone(&format!("w{i}.test")).unwrap();
                    }
                });
            }
        });
        assert_eq!(store.len(), 50);
    }

    #[test]
    fn test_append_logs_zone_field() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let store = ZoneStore::new();
        tracing::subscriber::with_default(subscriber, || {
            assert_ok!(store.add_zone("ads.example"));
            assert_ok!(store.add_zone("cdn.ads.example"));
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("adding ads.example in blocklist"));
        assert!(logs.contains("zone=ads.example"));
        assert!(!logs.contains("cdn.ads.example"));
    }
}
