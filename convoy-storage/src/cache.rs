//! Result cache implementation.
//!
//! The cache maps a query signature (table + pagination + ordering) to an
//! opaque serialized payload. It is internally synchronized and safe to share
//! across request tasks behind an `Arc`.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, Instant, MissedTickBehavior};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the result cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Total byte budget across all entries (default: 1 GiB).
    pub max_bytes: usize,

    /// Entries older than this are treated as absent (default: 4 hours).
    pub entry_ttl: Duration,

    /// How often the background sweep force-evicts expired entries
    /// (default: 4 hours).
    pub purge_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024 * 1024, // 1 GiB
            entry_ttl: Duration::from_secs(4 * 3600),
            purge_interval: Duration::from_secs(4 * 3600),
        }
    }
}

impl CacheConfig {
    /// Create CacheConfig from environment variables.
    ///
    /// Environment variables:
    /// - `CONVOY_CACHE_MAX_BYTES`: Total byte budget (default: 1073741824)
    /// - `CONVOY_CACHE_TTL_SECS`: Entry time-to-live (default: 14400)
    /// - `CONVOY_CACHE_PURGE_SECS`: Purge sweep interval (default: 14400)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_bytes = std::env::var("CONVOY_CACHE_MAX_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_bytes);

        let entry_ttl = std::env::var("CONVOY_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.entry_ttl);

        let purge_interval = std::env::var("CONVOY_CACHE_PURGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.purge_interval);

        Self {
            max_bytes,
            entry_ttl,
            purge_interval,
        }
    }
}

// ============================================================================
// QUERY SIGNATURE
// ============================================================================

/// Signature of a list query: entity kind plus pagination and ordering.
///
/// Two queries with the same signature are guaranteed to produce the same
/// result set within the staleness bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    /// Table name (static, from the entity descriptor).
    pub table: &'static str,
    pub page: i64,
    pub page_size: i64,
    pub order: String,
}

impl QueryKey {
    pub fn new(table: &'static str, page: i64, page_size: i64, order: &str) -> Self {
        Self {
            table,
            page,
            page_size,
            order: order.to_string(),
        }
    }
}

// ============================================================================
// METRICS
// ============================================================================

/// Counters tracking cache activity since startup.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
    pub expirations: AtomicU64,
}

impl CacheMetrics {
    /// Get a current snapshot of all counters.
    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of cache metrics at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

// ============================================================================
// CACHE
// ============================================================================

struct CacheEntry {
    payload: Arc<Vec<u8>>,
    inserted_at: Instant,
    last_used: u64,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<QueryKey, CacheEntry>,
    /// Recency index: access tick -> key. Ticks are unique, so the first
    /// entry is always the least recently used.
    recency: BTreeMap<u64, QueryKey>,
    total_bytes: usize,
    tick: u64,
}

impl CacheInner {
    fn remove(&mut self, key: &QueryKey) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(&entry.last_used);
        self.total_bytes -= entry.payload.len();
        Some(entry)
    }
}

/// Capacity- and time-bounded result cache with LRU eviction.
pub struct ResultCache {
    inner: Mutex<CacheInner>,
    config: CacheConfig,
    metrics: CacheMetrics,
}

impl ResultCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            config,
            metrics: CacheMetrics::default(),
        }
    }

    /// Create a new cache with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Number of live entries (including any not yet swept but expired).
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes currently held.
    pub fn total_bytes(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").total_bytes
    }

    /// Look up a query result. Expired entries are treated as absent and
    /// removed on access.
    pub fn get(&self, key: &QueryKey) -> Option<Arc<Vec<u8>>> {
        let mut inner = self.inner.lock().expect("cache lock poisoned");

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.inserted_at.elapsed() >= self.config.entry_ttl,
            None => {
                self.metrics.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        if expired {
            inner.remove(key);
            self.metrics.expirations.fetch_add(1, Ordering::Relaxed);
            self.metrics.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        inner.tick += 1;
        let tick = inner.tick;
        let entry = inner.entries.get_mut(key).expect("entry checked above");
        let previous = entry.last_used;
        entry.last_used = tick;
        let payload = Arc::clone(&entry.payload);
        inner.recency.remove(&previous);
        inner.recency.insert(tick, key.clone());

        self.metrics.hits.fetch_add(1, Ordering::Relaxed);
        Some(payload)
    }

    /// Store a query result, evicting least-recently-used entries until the
    /// byte budget holds. Payloads larger than the whole budget are not
    /// admitted.
    pub fn insert(&self, key: QueryKey, payload: Vec<u8>) {
        if payload.len() > self.config.max_bytes {
            tracing::debug!(
                table = key.table,
                bytes = payload.len(),
                "Payload exceeds cache budget, not admitted"
            );
            return;
        }

        let mut inner = self.inner.lock().expect("cache lock poisoned");

        // Replace any previous entry under the same signature.
        inner.remove(&key);

        inner.tick += 1;
        let tick = inner.tick;
        inner.total_bytes += payload.len();
        inner.recency.insert(tick, key.clone());
        inner.entries.insert(
            key,
            CacheEntry {
                payload: Arc::new(payload),
                inserted_at: Instant::now(),
                last_used: tick,
            },
        );

        while inner.total_bytes > self.config.max_bytes {
            let oldest = match inner.recency.keys().next().copied() {
                Some(tick) => tick,
                None => break,
            };
            let victim = inner.recency[&oldest].clone();
            inner.remove(&victim);
            self.metrics.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Force-evict every expired entry, regardless of access pattern.
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        let ttl = self.config.entry_ttl;

        let expired: Vec<QueryKey> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.inserted_at.elapsed() >= ttl)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.remove(key);
        }

        self.metrics
            .expirations
            .fetch_add(expired.len() as u64, Ordering::Relaxed);
        expired.len()
    }

    /// Spawn the background purge sweep. Runs until the shutdown signal is
    /// received.
    pub fn spawn_purge_task(
        self: &Arc<Self>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut sweep = interval(cache.config.purge_interval);
            sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Cache purge task shutting down");
                            break;
                        }
                    }
                    _ = sweep.tick() => {
                        let purged = cache.purge_expired();
                        if purged > 0 {
                            tracing::info!(purged, "Cache purge sweep evicted expired entries");
                        }
                    }
                }
            }
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
