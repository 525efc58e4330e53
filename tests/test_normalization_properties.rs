//! Property-based tests for decimal normalization
//!
//! These hold for all amounts, including ones far beyond 64-bit range.

use num_bigint::BigUint;
use num_traits::{pow, Zero};
use proptest::prelude::*;
use transfer_verifier_sdk::normalization::{
    denormalize, normalize, truncated_remainder, CANONICAL_DECIMALS,
};

fn big_amount() -> impl Strategy<Value = BigUint> {
    prop::collection::vec(any::<u8>(), 0..40).prop_map(|bytes| BigUint::from_bytes_be(&bytes))
}

proptest! {
    /// Property: at or below canonical precision both directions are identity
    #[test]
    fn identity_at_or_below_canonical(amount in big_amount(), decimals in 0u8..=CANONICAL_DECIMALS) {
        prop_assert_eq!(normalize(Some(&amount), decimals), Some(amount.clone()));
        prop_assert_eq!(denormalize(&amount, decimals), amount);
    }

    /// Property: above canonical precision normalize is floor division by 10^(d-8)
    #[test]
    fn normalize_is_floor_division(amount in big_amount(), decimals in 9u8..=30) {
        let divisor = pow(BigUint::from(10u32), (decimals - CANONICAL_DECIMALS) as usize);
        prop_assert_eq!(normalize(Some(&amount), decimals), Some(&amount / &divisor));
    }

    /// Property: the round trip loses exactly the truncated remainder
    #[test]
    fn round_trip_loses_only_remainder(amount in big_amount(), decimals in 0u8..=30) {
        let normalized = normalize(Some(&amount), decimals).unwrap();
        let restored = denormalize(&normalized, decimals);
        prop_assert!(restored <= amount);
        prop_assert_eq!(restored + truncated_remainder(&amount, decimals), amount);
    }

    /// Property: denormalize then normalize is lossless
    #[test]
    fn normalize_inverts_denormalize(amount in big_amount(), decimals in 0u8..=30) {
        prop_assert_eq!(normalize(Some(&denormalize(&amount, decimals)), decimals), Some(amount));
    }
}

#[test]
fn normalize_absent_is_absent() {
    for decimals in 0..=18u8 {
        assert_eq!(normalize(None, decimals), None);
    }
}

#[test]
fn documented_examples() {
    assert_eq!(
        normalize(Some(&BigUint::from(123_456_789_012_345_678u64)), 18),
        Some(BigUint::from(12_345u32))
    );
    // 100 wei is below canonical precision and is lost
    let lost = denormalize(&normalize(Some(&BigUint::from(100u32)), 18).unwrap(), 18);
    assert!(lost.is_zero());
}
