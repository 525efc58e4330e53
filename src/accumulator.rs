// src/accumulator.rs
//
// Running per-asset totals in canonical precision, folded into a bounded cache.

use crate::cache::{BoundedCache, CacheLimits};
use crate::eviction::{ArbitrarySelector, EvictionSelector};
use crate::metrics;
use crate::normalization::normalize;
use crate::types::{AssetKey, TransferRecord};
use log::warn;
use num_bigint::BigUint;

/// Canonical-precision totals keyed by [`AssetKey::cache_key`].
pub type AggregationCache<S = ArbitrarySelector> = BoundedCache<String, BigUint, S>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpsertError {
    #[error("invalid upsert argument: cache is not initialized")]
    UninitializedCache,
    #[error("invalid upsert argument: amount for key {key} is absent")]
    AbsentAmount { key: String },
}

/// Inserts `amount` under `key`, or adds it to the total already stored there.
///
/// The cache always receives its own copy of the amount. Fails, leaving the
/// cache untouched, when the slot is empty or the amount is unknown.
pub fn upsert<S>(
    cache: Option<&mut AggregationCache<S>>,
    key: &str,
    amount: Option<&BigUint>,
) -> Result<(), UpsertError>
where
    S: EvictionSelector<String>,
{
    let cache = cache.ok_or(UpsertError::UninitializedCache)?;
    let amount = amount.ok_or_else(|| UpsertError::AbsentAmount {
        key: key.to_string(),
    })?;

    match cache.get_mut(key) {
        Some(total) => *total += amount,
        None => {
            cache.insert(key.to_string(), amount.clone());
        }
    }
    metrics::increment_upsert(cache.name());
    Ok(())
}

/// Owns an aggregation cache and folds transfer records into it.
#[derive(Debug, Clone)]
pub struct AssetAccumulator<S = ArbitrarySelector> {
    cache: AggregationCache<S>,
}

impl AssetAccumulator<ArbitrarySelector> {
    pub fn new(limits: CacheLimits) -> Self {
        Self {
            cache: AggregationCache::new(limits),
        }
    }
}

impl<S: EvictionSelector<String>> AssetAccumulator<S> {
    pub fn with_cache(cache: AggregationCache<S>) -> Self {
        Self { cache }
    }

    /// Normalizes the record's amount to canonical precision and adds it to
    /// the running total for its asset key.
    pub fn record(&mut self, transfer: &TransferRecord) -> Result<BigUint, UpsertError> {
        let key = transfer.asset_key().cache_key();
        let normalized = normalize(transfer.amount.as_ref(), transfer.native_decimals);
        if let Err(e) = upsert(Some(&mut self.cache), &key, normalized.as_ref()) {
            warn!("Rejected transfer for {}: {}", key, e);
            metrics::increment_rejected_record("absent_amount");
            return Err(e);
        }
        // upsert succeeded, so the key is present
        Ok(self.cache.get(&key).cloned().unwrap_or_default())
    }

    pub fn total(&self, key: &AssetKey) -> Option<&BigUint> {
        self.cache.get(&key.cache_key())
    }

    pub fn trim(&mut self) -> usize {
        self.cache.trim()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Every (key, total) pair currently held, in cache-key form.
    ///
    /// Keys written through [`upsert`] or [`AssetAccumulator::cache_mut`] are
    /// returned as stored even when [`AssetKey::parse`] would reject them.
    pub fn totals(&self) -> impl Iterator<Item = (&str, &BigUint)> {
        self.cache.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn cache(&self) -> &AggregationCache<S> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut AggregationCache<S> {
        &mut self.cache
    }
}
