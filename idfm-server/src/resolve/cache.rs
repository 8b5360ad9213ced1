//! TTL caches for resolved identifiers.
//!
//! Resolving a line or a stop scans tables with hundreds of thousands of
//! rows, so resolved ids are kept for a long time. Two instances exist: one
//! keyed by line query, one keyed by (line, stop, direction, platform).
//!
//! Both are bounded by entry count with least-recently-used eviction, and
//! each entry carries its own TTL.

use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache as MokaCache;
use moka::notification::RemovalCause;
use moka::policy::EvictionPolicy;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::domain::{Direction, LineId, StopId, TransportType};

/// Default TTL of resolved ids (12 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// How often the background sweep purges expired entries.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Identity of a resolved line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineCacheKey {
    pub mode: TransportType,
    pub short_name: String,
    /// Operator override; `None` means the default accepted operators.
    pub operator: Option<String>,
}

/// Identity of a resolved directional stop.
///
/// `None` direction/platform means the query was unconstrained on that axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StopCacheKey {
    pub line: LineId,
    pub stop_name: String,
    pub direction: Option<Direction>,
    pub platform: Option<String>,
}

/// Line query → canonical line id.
pub type LineCache = ResolutionCache<LineCacheKey, LineId>;

/// Directional stop query → the stop id that served it.
pub type StopCache = ResolutionCache<StopCacheKey, StopId>;

/// Configuration for a resolution cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied by [`ResolutionCache::insert`].
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl CacheConfig {
    /// Line cache: few distinct keys.
    pub fn lines() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_capacity: 100,
        }
    }

    /// Stop cache: the (line, stop, direction, platform) key space is larger.
    pub fn stops() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_capacity: 1000,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

/// Counter snapshot for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    /// Entries removed by expiry or capacity pressure.
    pub evictions: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    evictions: AtomicU64,
}

/// Cached value together with the TTL it was stored with.
#[derive(Debug, Clone)]
struct Timed<V> {
    value: V,
    ttl: Duration,
}

/// Expires every entry after its own TTL, counted from the last write.
struct PerEntryTtl;

impl<K, V> Expiry<K, Timed<V>> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &K,
        value: &Timed<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &K,
        value: &Timed<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// A capacity-bounded key → value cache with per-entry TTL and counters.
///
/// Cloning is cheap and clones share storage and counters.
pub struct ResolutionCache<K, V> {
    entries: MokaCache<K, Timed<V>>,
    counters: Arc<Counters>,
    default_ttl: Duration,
}

impl<K, V> Clone for ResolutionCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            counters: Arc::clone(&self.counters),
            default_ttl: self.default_ttl,
        }
    }
}

impl<K, V> ResolutionCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: &CacheConfig) -> Self {
        let counters = Arc::new(Counters::default());

        let listener_counters = Arc::clone(&counters);
        let entries = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(PerEntryTtl)
            .eviction_listener(move |_key, _value, cause: RemovalCause| {
                if cause.was_evicted() {
                    listener_counters.evictions.fetch_add(1, Ordering::Relaxed);
                }
            })
            .build();

        Self {
            entries,
            counters,
            default_ttl: config.ttl,
        }
    }

    /// Look up a live entry. Expired entries are misses.
    pub async fn get(&self, key: &K) -> Option<V> {
        match self.entries.get(key).await {
            Some(timed) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(timed.value)
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a value with an explicit TTL.
    pub async fn set(&self, key: K, value: V, ttl: Duration) {
        self.entries.insert(key, Timed { value, ttl }).await;
        self.counters.insertions.fetch_add(1, Ordering::Relaxed);
    }

    /// Store a value with the cache's default TTL.
    pub async fn insert(&self, key: K, value: V) {
        self.set(key, value, self.default_ttl).await;
    }

    /// Number of entries. Approximate until pending maintenance has run.
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply pending expirations and evictions now.
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            insertions: self.counters.insertions.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        }
    }

    /// Spawn the background sweep that purges expired entries even when no
    /// request touches the cache.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                cache.run_pending_tasks().await;
            }
        })
    }
}
