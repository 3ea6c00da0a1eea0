//! Shared cache for engine breakdowns and the batch fetch on top of it.

use crate::cache_key::MetricKey;
use crate::result::MetricResult;
use moka::sync::Cache;
use reports_common::Result;
use reports_config::CacheSettings;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Key/value store shared by all engines.
///
/// Implementations must be safe to share across threads. No per-key locking
/// is expected: two engines missing the same key both compute it and the last
/// write wins.
pub trait MetricCache: Send + Sync {
    /// Looks up `key`.
    fn get(&self, key: &MetricKey) -> Result<Option<MetricResult>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: &MetricKey, value: MetricResult) -> Result<()>;

    /// Resolves every key, computing and storing the ones that are missing.
    ///
    /// Every distinct input key appears once in the output and is computed at
    /// most once. With `force`, lookups are skipped and every key is computed
    /// and overwritten. The first compute failure aborts the batch; the failing
    /// key is not written but keys resolved before it may have been.
    fn get_or_set_many(
        &self,
        keys: &[MetricKey],
        force: bool,
        compute: &mut dyn FnMut(&MetricKey) -> Result<MetricResult>,
    ) -> Result<HashMap<MetricKey, MetricResult>> {
        let mut resolved = HashMap::with_capacity(keys.len());

        for key in keys {
            if resolved.contains_key(key) {
                continue;
            }

            if !force {
                if let Some(value) = self.get(key)? {
                    resolved.insert(key.clone(), value);
                    continue;
                }
            }

            let value = compute(key)?;
            self.put(key, value.clone())?;
            resolved.insert(key.clone(), value);
        }

        Ok(resolved)
    }
}

/// Cache performance counters.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub writes: AtomicU64,
    pub invalidations: AtomicU64,
}

impl CacheMetrics {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let total = hits + self.misses.load(Ordering::Relaxed) as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }

    pub fn get_stats(&self) -> HashMap<String, u64> {
        let mut stats = HashMap::new();
        stats.insert("hits".to_string(), self.hits.load(Ordering::Relaxed));
        stats.insert("misses".to_string(), self.misses.load(Ordering::Relaxed));
        stats.insert("writes".to_string(), self.writes.load(Ordering::Relaxed));
        stats.insert(
            "invalidations".to_string(),
            self.invalidations.load(Ordering::Relaxed),
        );
        stats
    }
}

/// Stored key: the logical key plus the generation it was written under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct VersionedKey {
    generation: u32,
    key: MetricKey,
}

/// In-process [`MetricCache`] backed by moka.
pub struct MokaMetricCache {
    cache: Cache<VersionedKey, MetricResult>,
    generation: AtomicU32,
    metrics: CacheMetrics,
}

impl MokaMetricCache {
    /// Creates a cache with the given bounds, starting at `generation`.
    pub fn new(max_capacity: u64, ttl: Duration, tti: Option<Duration>, generation: u32) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .time_to_idle(tti.unwrap_or(ttl))
            .build();

        Self {
            cache,
            generation: AtomicU32::new(generation),
            metrics: CacheMetrics::default(),
        }
    }

    /// Creates a cache from the `cache` settings section.
    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(
            settings.max_capacity,
            settings.ttl(),
            settings.tti_seconds.map(Duration::from_secs),
            settings.generation,
        )
    }

    /// Current cache generation.
    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Acquire)
    }

    /// Moves to the next generation, making every existing entry unreachable.
    /// Old entries age out through the TTL.
    #[instrument(skip(self))]
    pub fn bump_generation(&self) -> u32 {
        let next = self.generation.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        self.metrics.record_invalidation();
        info!(generation = next, "Cache generation bumped");
        next
    }

    /// Drops every entry.
    #[instrument(skip(self))]
    pub fn invalidate_all(&self) {
        self.cache.run_pending_tasks();
        let entry_count = self.cache.entry_count();
        self.cache.invalidate_all();
        self.metrics
            .invalidations
            .fetch_add(entry_count, Ordering::Relaxed);
        info!("Invalidated {} cache entries", entry_count);
    }

    /// Cache counters.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Counters plus entry count and generation.
    pub fn stats(&self) -> HashMap<String, u64> {
        self.cache.run_pending_tasks();
        let mut stats = self.metrics.get_stats();
        stats.insert("entry_count".to_string(), self.cache.entry_count());
        stats.insert("generation".to_string(), u64::from(self.generation()));
        stats
    }

    fn versioned(&self, key: &MetricKey) -> VersionedKey {
        VersionedKey {
            generation: self.generation(),
            key: key.clone(),
        }
    }
}

impl Default for MokaMetricCache {
    fn default() -> Self {
        Self::from_settings(&CacheSettings::default())
    }
}

impl MetricCache for MokaMetricCache {
    #[instrument(skip(self), fields(key = %key))]
    fn get(&self, key: &MetricKey) -> Result<Option<MetricResult>> {
        match self.cache.get(&self.versioned(key)) {
            Some(value) => {
                debug!("Cache hit");
                self.metrics.record_hit();
                Ok(Some(value))
            }
            None => {
                debug!("Cache miss");
                self.metrics.record_miss();
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, value), fields(key = %key))]
    fn put(&self, key: &MetricKey, value: MetricResult) -> Result<()> {
        self.cache.insert(self.versioned(key), value);
        self.metrics.record_write();
        Ok(())
    }
}
