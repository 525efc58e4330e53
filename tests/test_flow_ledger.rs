//! Integration tests for bounded aggregation
//!
//! Tests cover:
//! - Batch trimming at the default capacity
//! - Upsert accumulation, copy and rejection semantics
//! - End-to-end normalization into the flow ledger
//! - Ledger trims that keep each asset's two sides together

use num_bigint::{BigInt, BigUint};
use std::collections::HashSet;
use transfer_verifier_sdk::{
    cache::{CACHE_DELETE_COUNT, CACHE_MAX_SIZE},
    eviction::{EvictionSelector, SeededSelector},
    flow_ledger::TrimReport,
    trim_cache, upsert, AggregationCache, AssetKey, BoundedCache, CacheError, CacheLimits,
    ChainId, FlowDirection, FlowLedger, TransferRecord, UpsertError,
};

fn default_cache() -> AggregationCache {
    AggregationCache::new(CacheLimits::default())
}

/// 111 distinct keys: one trim removes max(10, 11) = 11 and a second trim is a no-op
#[test]
fn test_trim_111_keys_to_capacity() {
    assert_eq!(CACHE_MAX_SIZE, 100);
    assert_eq!(CACHE_DELETE_COUNT, 10);

    let mut cache = default_cache();
    for i in 0..111u32 {
        upsert(Some(&mut cache), &format!("asset-{}", i), Some(&BigUint::from(i))).unwrap();
    }
    assert_eq!(cache.len(), 111);

    assert_eq!(trim_cache(Some(&mut cache)).unwrap(), 11);
    assert_eq!(cache.len(), 100);
    assert_eq!(trim_cache(Some(&mut cache)).unwrap(), 0);
    assert_eq!(cache.len(), 100);
}

/// Survivors keep their values; nothing is rewritten by a trim
#[test]
fn test_trim_keeps_surviving_values() {
    let mut cache = default_cache();
    for i in 0..150u32 {
        cache.insert(format!("asset-{}", i), BigUint::from(i));
    }
    assert_eq!(cache.trim(), 50);
    for (key, value) in cache.iter() {
        let index: u32 = key.trim_start_matches("asset-").parse().unwrap();
        assert_eq!(value, &BigUint::from(index));
    }
}

#[test]
fn test_seeded_selector_gives_repeatable_victims() {
    let run = |seed: u64| -> HashSet<String> {
        let mut cache: BoundedCache<String, BigUint, SeededSelector> =
            BoundedCache::with_selector(CacheLimits::default(), SeededSelector::new(seed));
        for i in 0..130u32 {
            cache.insert(format!("asset-{}", i), BigUint::from(i));
        }
        assert_eq!(cache.trim(), 30);
        cache.keys().cloned().collect()
    };
    assert_eq!(run(11), run(11));
}

#[test]
fn test_invalid_limits_fail_at_construction() {
    assert!(matches!(
        CacheLimits::new(100, 100),
        Err(CacheError::InvalidLimits { .. })
    ));
}

#[test]
fn test_uninitialized_slots_fail_loudly() {
    let mut slot: Option<AggregationCache> = None;
    assert_eq!(trim_cache(slot.as_mut()).unwrap_err(), CacheError::Uninitialized);
    assert_eq!(
        upsert(slot.as_mut(), "k", Some(&BigUint::from(1u32))).unwrap_err(),
        UpsertError::UninitializedCache
    );

    slot = Some(default_cache());
    upsert(slot.as_mut(), "k", Some(&BigUint::from(1u32))).unwrap();
    assert_eq!(slot.unwrap().len(), 1);
}

#[test]
fn test_upsert_semantics() {
    let mut cache = default_cache();

    let mut five = BigUint::from(5u32);
    upsert(Some(&mut cache), "k", Some(&five)).unwrap();
    five *= 100u32;
    assert_eq!(five, BigUint::from(500u32));
    assert_eq!(cache.get("k"), Some(&BigUint::from(5u32)));

    upsert(Some(&mut cache), "k", Some(&BigUint::from(7u32))).unwrap();
    assert_eq!(cache.get("k"), Some(&BigUint::from(12u32)));

    let err = upsert(Some(&mut cache), "k", None).unwrap_err();
    assert!(matches!(err, UpsertError::AbsentAmount { .. }));
    assert_eq!(cache.get("k"), Some(&BigUint::from(12u32)));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_ledger_end_to_end() {
    let mut ledger = FlowLedger::new(CacheLimits::default());
    let weth = AssetKey::new(vec![0xc0; 32], ChainId::ETHEREUM);

    // 1.5 WETH in, 2 WETH out (18 decimals), plus dust below canonical precision
    let inbound = TransferRecord::new(
        Some(BigUint::from(1_500_000_000_000_000_000u64)),
        18,
        weth.origin_address.clone(),
        ChainId::ETHEREUM,
    );
    let outbound = TransferRecord::new(
        Some(BigUint::from(2_000_000_000_000_000_001u64)),
        18,
        weth.origin_address.clone(),
        ChainId::ETHEREUM,
    );
    ledger.record(FlowDirection::Inbound, &inbound).unwrap();
    ledger.record(FlowDirection::Outbound, &outbound).unwrap();

    let snap = ledger.snapshot(&weth).unwrap();
    assert_eq!(snap.inbound, BigUint::from(150_000_000u64));
    assert_eq!(snap.outbound, BigUint::from(200_000_000u64));
    assert_eq!(snap.net().to_string(), "-50000000");

    // Same address on another chain is a different asset
    let other_chain = AssetKey::new(vec![0xc0; 32], ChainId::SEPOLIA);
    assert!(ledger.snapshot(&other_chain).is_none());
}

#[test]
fn test_ledger_stays_bounded() {
    let mut ledger = FlowLedger::new(CacheLimits::default());
    for i in 0..1_000u32 {
        let record = TransferRecord::new(
            Some(BigUint::from(1u32)),
            8,
            i.to_be_bytes().to_vec(),
            ChainId::ETHEREUM,
        );
        ledger.record(FlowDirection::Inbound, &record).unwrap();
        ledger.trim();
        assert!(ledger.inbound().len() <= CACHE_MAX_SIZE);
    }
}

fn balanced_ledger<S>(mut ledger: FlowLedger<S>, assets: u32) -> FlowLedger<S>
where
    S: EvictionSelector<String>,
{
    for i in 0..assets {
        let record = TransferRecord::new(
            Some(BigUint::from(1_000u32)),
            8,
            i.to_be_bytes().to_vec(),
            ChainId::ETHEREUM,
        );
        ledger.record(FlowDirection::Inbound, &record).unwrap();
        ledger.record(FlowDirection::Outbound, &record).unwrap();
    }
    ledger
}

/// Balanced assets stay balanced after a trim: eviction never splits an asset
#[test]
fn test_trim_keeps_balanced_assets_balanced() {
    let mut ledger = balanced_ledger(FlowLedger::new(CacheLimits::default()), 101);

    let report = ledger.trim();
    assert_eq!(
        report,
        TrimReport {
            assets_removed: 10,
            inbound_removed: 10,
            outbound_removed: 10,
        }
    );

    let snapshots = ledger.snapshots();
    assert_eq!(snapshots.len(), 91);
    for snap in &snapshots {
        assert_eq!(snap.net(), BigInt::from(0), "asset {} skewed by trim", snap.key);
        assert_eq!(snap.inbound, BigUint::from(1_000u32));
    }
}

#[test]
fn test_seeded_ledger_trim_keeps_balanced_assets_balanced() {
    for seed in 0..8u64 {
        let mut ledger = balanced_ledger(
            FlowLedger::with_selector(CacheLimits::new(50, 7).unwrap(), SeededSelector::new(seed)),
            80,
        );
        assert_eq!(ledger.trim().assets_removed, 30);
        assert_eq!(ledger.len(), 50);
        assert!(ledger.snapshots().iter().all(|s| s.net() == BigInt::from(0)));
    }
}
