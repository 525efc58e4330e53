// src/flow_ledger.rs
//
// Inbound/outbound totals per bridged asset. The ledger only aggregates; deciding
// whether a flow imbalance is suspicious belongs to the caller.

use crate::accumulator::{AssetAccumulator, UpsertError};
use crate::cache::{BoundedCache, CacheLimits};
use crate::eviction::{resolve_victims, ArbitrarySelector, EvictionSelector};
use crate::metrics;
use crate::types::{AssetKey, FlowDirection, FlowEvent, TransferRecord};
use log::debug;
use num_bigint::{BigInt, BigUint};
use serde::Serialize;
use std::collections::BTreeSet;

/// Totals for one asset at the moment of the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSnapshot {
    pub key: String,
    #[serde(serialize_with = "serialize_biguint")]
    pub inbound: BigUint,
    #[serde(serialize_with = "serialize_biguint")]
    pub outbound: BigUint,
}

impl FlowSnapshot {
    /// Inbound minus outbound, in canonical precision.
    pub fn net(&self) -> BigInt {
        BigInt::from(self.inbound.clone()) - BigInt::from(self.outbound.clone())
    }
}

/// Entries removed by one [`FlowLedger::trim`].
///
/// `assets_removed` counts evicted assets; the per-side counts are the cache
/// entries that went with them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrimReport {
    pub assets_removed: usize,
    pub inbound_removed: usize,
    pub outbound_removed: usize,
}

impl TrimReport {
    pub fn total(&self) -> usize {
        self.inbound_removed + self.outbound_removed
    }
}

/// Paired inbound/outbound accumulators bounded as one unit.
///
/// The limits apply to the number of distinct assets across both sides. A trim
/// evicts whole assets, so a surviving asset always keeps both of its totals.
/// An evicted asset that shows up again starts from zero on both sides.
pub struct FlowLedger<S = ArbitrarySelector> {
    limits: CacheLimits,
    selector: S,
    inbound: AssetAccumulator,
    outbound: AssetAccumulator,
}

impl FlowLedger<ArbitrarySelector> {
    pub fn new(limits: CacheLimits) -> Self {
        Self::with_selector(limits, ArbitrarySelector)
    }
}

impl<S: EvictionSelector<String>> FlowLedger<S> {
    pub fn with_selector(limits: CacheLimits, selector: S) -> Self {
        Self {
            limits,
            selector,
            inbound: AssetAccumulator::with_cache(BoundedCache::new(limits).named("inbound")),
            outbound: AssetAccumulator::with_cache(BoundedCache::new(limits).named("outbound")),
        }
    }

    pub fn limits(&self) -> CacheLimits {
        self.limits
    }

    pub fn record(
        &mut self,
        direction: FlowDirection,
        transfer: &TransferRecord,
    ) -> Result<BigUint, UpsertError> {
        metrics::increment_ledger_event(direction.as_str());
        match direction {
            FlowDirection::Inbound => self.inbound.record(transfer),
            FlowDirection::Outbound => self.outbound.record(transfer),
        }
    }

    pub fn apply(&mut self, event: &FlowEvent) -> Result<BigUint, UpsertError> {
        self.record(event.direction, &event.record)
    }

    /// Totals for one asset. A side with no transfers since the asset was
    /// admitted reads as zero; `None` when the asset is not tracked.
    pub fn snapshot(&self, key: &AssetKey) -> Option<FlowSnapshot> {
        let inbound = self.inbound.total(key);
        let outbound = self.outbound.total(key);
        if inbound.is_none() && outbound.is_none() {
            return None;
        }
        Some(FlowSnapshot {
            key: key.cache_key(),
            inbound: inbound.cloned().unwrap_or_default(),
            outbound: outbound.cloned().unwrap_or_default(),
        })
    }

    /// Distinct assets tracked on either side.
    pub fn len(&self) -> usize {
        self.asset_keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inbound.is_empty() && self.outbound.is_empty()
    }

    /// Snapshots for every asset present on either side, ordered by key.
    pub fn snapshots(&self) -> Vec<FlowSnapshot> {
        self.asset_keys()
            .into_iter()
            .map(|key| FlowSnapshot {
                key: key.clone(),
                inbound: self.inbound.cache().get(key).cloned().unwrap_or_default(),
                outbound: self.outbound.cache().get(key).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Evicts `max(delete_count, assets - max_size)` assets once more than
    /// `max_size` are tracked. Victims are drawn from the union of both sides
    /// and removed from both.
    pub fn trim(&mut self) -> TrimReport {
        let keys: Vec<String> = self.asset_keys().into_iter().cloned().collect();
        let remove_count = self.limits.removal_count(keys.len());
        if remove_count == 0 {
            return TrimReport::default();
        }

        let victims = resolve_victims(&mut self.selector, &keys, remove_count);
        let mut report = TrimReport {
            assets_removed: victims.len(),
            ..TrimReport::default()
        };
        for key in &victims {
            if self.inbound.cache_mut().remove(key).is_some() {
                report.inbound_removed += 1;
            }
            if self.outbound.cache_mut().remove(key).is_some() {
                report.outbound_removed += 1;
            }
        }

        for side in [&self.inbound, &self.outbound] {
            metrics::set_cache_size(side.cache().name(), side.len());
        }
        metrics::record_trim("inbound", report.inbound_removed);
        metrics::record_trim("outbound", report.outbound_removed);
        debug!(
            "Ledger trim evicted {} assets ({} inbound / {} outbound entries, {} -> {} assets)",
            report.assets_removed,
            report.inbound_removed,
            report.outbound_removed,
            keys.len(),
            keys.len() - report.assets_removed
        );
        report
    }

    pub fn inbound(&self) -> &AssetAccumulator {
        &self.inbound
    }

    pub fn outbound(&self) -> &AssetAccumulator {
        &self.outbound
    }

    fn asset_keys(&self) -> BTreeSet<&String> {
        self.inbound
            .cache()
            .keys()
            .chain(self.outbound.cache().keys())
            .collect()
    }
}

fn serialize_biguint<Ser: serde::Serializer>(value: &BigUint, s: Ser) -> Result<Ser::Ok, Ser::Error> {
    s.serialize_str(&value.to_string())
}
