// =============================================================================
// Fetch Cache — time-bounded market bundles, keyed by requested symbol
// =============================================================================
//
// One fetch pass per symbol per TTL window: the cache stores the raw
// `MarketBundle` (bars + fundamentals + name), NOT finished reports, so a
// fair-value override or a config change never serves a stale conclusion.
//
// Time is injected through the `Clock` trait; tests drive expiry with a
// manual clock instead of sleeping. The TTL is passed on every call because
// it lives in the runtime config and can change between requests.
//
// Expired entries are purged opportunistically on `put` — the system stays
// request-driven, with no background sweeper task.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::types::MarketBundle;

/// Source of monotonic time for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The real clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A manually advanced clock for deterministic expiry tests.
#[cfg(test)]
pub struct MockClock {
    base: Instant,
    offset: parking_lot::Mutex<Duration>,
}

#[cfg(test)]
impl MockClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: parking_lot::Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

#[cfg(test)]
impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}

struct CacheEntry {
    bundle: MarketBundle,
    inserted_at: Instant,
}

/// Thread-safe fetch-result cache keyed by the *requested* symbol (the key
/// the user typed, not the exchange-suffixed symbol the bars came from).
pub struct FetchCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: std::sync::Arc<dyn Clock>,
}

impl FetchCache {
    pub fn new(clock: std::sync::Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Look up a bundle younger than `ttl`.
    ///
    /// Returns the bundle plus its age; an entry aged exactly `ttl` counts
    /// as expired.
    pub fn get(&self, key: &str, ttl: Duration) -> Option<(MarketBundle, Duration)> {
        let now = self.clock.now();
        let entries = self.entries.read();
        let entry = entries.get(key)?;

        let age = now.duration_since(entry.inserted_at);
        if age < ttl {
            Some((entry.bundle.clone(), age))
        } else {
            None
        }
    }

    /// Insert a bundle and purge entries that have outlived `ttl`.
    pub fn put(&self, key: &str, bundle: MarketBundle, ttl: Duration) {
        let now = self.clock.now();
        let mut entries = self.entries.write();

        entries.retain(|_, e| now.duration_since(e.inserted_at) < ttl);
        entries.insert(
            key.to_string(),
            CacheEntry {
                bundle,
                inserted_at: now,
            },
        );
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
