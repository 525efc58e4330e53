// src/types/conversions.rs

use ethers::types::{Address, U256};
use num_bigint::BigUint;
use std::str::FromStr;

/// Width of a cross-chain (universal) address. EVM addresses are left-padded.
pub const UNIVERSAL_ADDRESS_LEN: usize = 32;

// Amounts decoded from EVM logs
pub fn u256_to_biguint(value: U256) -> BigUint {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    BigUint::from_bytes_be(&bytes)
}

pub fn biguint_to_u256(value: &BigUint) -> Result<U256, ConversionError> {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(ConversionError::Overflow);
    }
    Ok(U256::from_big_endian(&bytes))
}

pub fn evm_address_to_universal(addr: Address) -> [u8; UNIVERSAL_ADDRESS_LEN] {
    let mut out = [0u8; UNIVERSAL_ADDRESS_LEN];
    out[UNIVERSAL_ADDRESS_LEN - 20..].copy_from_slice(addr.as_bytes());
    out
}

/// Parses a hex address with or without `0x` prefix.
pub fn parse_hex_address(s: &str) -> Result<Vec<u8>, ConversionError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(ConversionError::InvalidAddress("empty address".to_string()));
    }
    hex::decode(digits).map_err(|e| ConversionError::InvalidAddress(e.to_string()))
}

/// Parses a base-10 token amount.
pub fn parse_amount(s: &str) -> Result<BigUint, ConversionError> {
    BigUint::from_str(s.trim()).map_err(|e| ConversionError::InvalidAmount(format!("{}: {}", s, e)))
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Overflow in conversion")]
    Overflow,
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}
