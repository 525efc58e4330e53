// src/normalization.rs
//
// Decimal normalization between a chain-native token precision and the canonical
// 8-decimal precision used by bridged (wrapped) assets.

use num_bigint::BigUint;
use num_traits::{pow, One};

/// Canonical precision every native amount is reduced to before aggregation.
pub const CANONICAL_DECIMALS: u8 = 8;

/// Helper: 10^(decimals - 8) for decimals above canonical precision, otherwise 1.
#[inline]
pub fn scale_factor(decimals: u8) -> BigUint {
    if decimals > CANONICAL_DECIMALS {
        pow10(decimals - CANONICAL_DECIMALS)
    } else {
        BigUint::one()
    }
}

/// Helper: 10^n as an arbitrary-precision integer (never overflows)
#[inline]
pub fn pow10(n: u8) -> BigUint {
    pow(BigUint::from(10u32), n as usize)
}

/// Normalize an amount to 8 decimals.
///
/// If `decimals` is greater than 8 the amount is divided by 10^(decimals - 8)
/// with floor division, so any remainder below the canonical precision is
/// dropped. Amounts with 8 or fewer decimals are returned as is. An absent
/// amount stays absent.
pub fn normalize(amount: Option<&BigUint>, decimals: u8) -> Option<BigUint> {
    let amount = amount?;
    if decimals > CANONICAL_DECIMALS {
        Some(amount / scale_factor(decimals))
    } else {
        Some(amount.clone())
    }
}

/// Scale a canonical amount back to its native decimal representation.
///
/// This is the inverse of [`normalize`] only for `decimals <= 8`. Above that,
/// the digits truncated by `normalize` are gone: `denormalize(normalize(100, 18), 18)`
/// is zero.
pub fn denormalize(amount: &BigUint, decimals: u8) -> BigUint {
    if decimals > CANONICAL_DECIMALS {
        amount * scale_factor(decimals)
    } else {
        amount.clone()
    }
}

/// Remainder that [`normalize`] discards for the given precision (zero when lossless).
pub fn truncated_remainder(amount: &BigUint, decimals: u8) -> BigUint {
    amount % scale_factor(decimals)
}
