// src/cache.rs
//
// Capacity-limited aggregation store with batch eviction.

use crate::eviction::{resolve_victims, ArbitrarySelector, EvictionSelector};
use crate::metrics;
use log::debug;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Maximum number of entries any aggregation cache should hold after a trim.
pub const CACHE_MAX_SIZE: usize = 100;

/// Minimum number of entries removed by a trim once the cache exceeds
/// [`CACHE_MAX_SIZE`]. Must be less than `CACHE_MAX_SIZE`.
pub const CACHE_DELETE_COUNT: usize = 10;

const _: () = assert!(CACHE_DELETE_COUNT < CACHE_MAX_SIZE);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("cache is not initialized")]
    Uninitialized,
    #[error("invalid cache limits: delete_count ({delete_count}) must be less than max_size ({max_size})")]
    InvalidLimits { max_size: usize, delete_count: usize },
}

/// Capacity bound and eviction batch size, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    max_size: usize,
    delete_count: usize,
}

impl CacheLimits {
    pub fn new(max_size: usize, delete_count: usize) -> Result<Self, CacheError> {
        if max_size == 0 || delete_count >= max_size {
            return Err(CacheError::InvalidLimits {
                max_size,
                delete_count,
            });
        }
        Ok(Self {
            max_size,
            delete_count,
        })
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn delete_count(&self) -> usize {
        self.delete_count
    }

    /// Entries a trim must remove at `current_len`, zero when within bounds.
    pub fn removal_count(&self, current_len: usize) -> usize {
        if current_len <= self.max_size {
            0
        } else {
            self.delete_count.max(current_len - self.max_size)
        }
    }
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            max_size: CACHE_MAX_SIZE,
            delete_count: CACHE_DELETE_COUNT,
        }
    }
}

/// Capacity-limited map with batch eviction.
///
/// The cache never trims on its own: the owner calls [`BoundedCache::trim`]
/// when it sees fit, and nothing is removed until the size exceeds
/// `max_size`. The backing store is exclusively owned and unsynchronized;
/// share it across tasks only behind the owner's own lock or task boundary.
#[derive(Debug, Clone)]
pub struct BoundedCache<K, V, S = ArbitrarySelector> {
    store: HashMap<K, V>,
    limits: CacheLimits,
    selector: S,
    name: &'static str,
}

impl<K, V> BoundedCache<K, V, ArbitrarySelector>
where
    K: Eq + Hash + Clone,
{
    pub fn new(limits: CacheLimits) -> Self {
        Self::with_selector(limits, ArbitrarySelector)
    }
}

impl<K, V, S> BoundedCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: EvictionSelector<K>,
{
    pub fn with_selector(limits: CacheLimits, selector: S) -> Self {
        Self {
            store: HashMap::with_capacity(limits.max_size() + limits.delete_count()),
            limits,
            selector,
            name: "aggregation",
        }
    }

    /// Label used in logs and metrics.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn limits(&self) -> CacheLimits {
        self.limits
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.get_mut(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.contains_key(key)
    }

    /// Inserts or replaces a value. Does not trim.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.store.insert(key, value)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.remove(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.store.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.store.iter()
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Removes an eviction batch once the cache holds more than `max_size` entries.
    ///
    /// Removes `max(delete_count, len - max_size)` distinct keys chosen by the
    /// selector and returns how many were removed. Within bounds this is a
    /// no-op returning 0. Selector answers that repeat keys or come up short
    /// are topped up, so the cache never stays above `max_size`.
    pub fn trim(&mut self) -> usize {
        let current_len = self.store.len();
        let remove_count = self.limits.removal_count(current_len);
        if remove_count == 0 {
            return 0;
        }

        let keys: Vec<K> = self.store.keys().cloned().collect();
        let victims = resolve_victims(&mut self.selector, &keys, remove_count);

        let mut removed = 0;
        for key in &victims {
            if self.store.remove(key).is_some() {
                removed += 1;
            }
        }

        debug!(
            "Trimmed {} entries from {} cache (size: {} -> {})",
            removed,
            self.name,
            current_len,
            self.store.len()
        );
        metrics::record_trim(self.name, removed);
        metrics::set_cache_size(self.name, self.store.len());
        removed
    }
}

/// Trims a cache slot that may never have been allocated.
///
/// An empty slot is a programming error and is reported as
/// [`CacheError::Uninitialized`] rather than treated as an empty cache.
pub fn trim_cache<K, V, S>(cache: Option<&mut BoundedCache<K, V, S>>) -> Result<usize, CacheError>
where
    K: Eq + Hash + Clone,
    S: EvictionSelector<K>,
{
    let cache = cache.ok_or(CacheError::Uninitialized)?;
    Ok(cache.trim())
}
