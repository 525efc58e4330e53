// src/types/transfer.rs
//
// Asset keys, transfer records and flow events as they cross the watcher boundary.

use crate::chains::ChainId;
use crate::types::conversions::{
    evm_address_to_universal, parse_amount, parse_hex_address, u256_to_biguint,
};
use ethers::types::{Address, U256};
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Separator between the address and chain halves of an asset key.
/// Neither hex digits nor a decimal chain id can contain it.
pub const KEY_SEPARATOR: char = '-';

/// Identifies a bridged asset by where it originally lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetKey {
    pub origin_address: Vec<u8>,
    pub origin_chain: ChainId,
}

impl AssetKey {
    pub fn new(origin_address: impl Into<Vec<u8>>, origin_chain: ChainId) -> Self {
        Self {
            origin_address: origin_address.into(),
            origin_chain,
        }
    }

    /// Key for an ERC-20 token native to an EVM chain.
    pub fn from_evm(token: Address, origin_chain: ChainId) -> Self {
        Self::new(evm_address_to_universal(token).to_vec(), origin_chain)
    }

    /// Canonical string form, `<hex address>-<chain id>`.
    pub fn cache_key(&self) -> String {
        self.to_string()
    }

    /// Parses the canonical string form back into a key.
    pub fn parse(s: &str) -> Option<Self> {
        let (address, chain) = s.rsplit_once(KEY_SEPARATOR)?;
        let chain: u16 = chain.parse().ok()?;
        let origin_address = hex::decode(address).ok()?;
        Some(Self::new(origin_address, ChainId(chain)))
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            hex::encode(&self.origin_address),
            KEY_SEPARATOR,
            self.origin_chain.0
        )
    }
}

/// A decoded transfer as reported by a chain watcher or log decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Raw amount in native precision. `None` when the decoder could not determine it.
    #[serde(
        default,
        serialize_with = "serialize_amount",
        deserialize_with = "deserialize_amount"
    )]
    pub amount: Option<BigUint>,
    pub native_decimals: u8,
    #[serde(serialize_with = "serialize_address", deserialize_with = "deserialize_address")]
    pub origin_address: Vec<u8>,
    pub origin_chain: ChainId,
}

impl TransferRecord {
    pub fn new(
        amount: Option<BigUint>,
        native_decimals: u8,
        origin_address: impl Into<Vec<u8>>,
        origin_chain: ChainId,
    ) -> Self {
        Self {
            amount,
            native_decimals,
            origin_address: origin_address.into(),
            origin_chain,
        }
    }

    /// Builds a record from values decoded out of an EVM `Transfer` log.
    pub fn from_evm(amount: U256, native_decimals: u8, token: Address, origin_chain: ChainId) -> Self {
        Self::new(
            Some(u256_to_biguint(amount)),
            native_decimals,
            evm_address_to_universal(token).to_vec(),
            origin_chain,
        )
    }

    pub fn asset_key(&self) -> AssetKey {
        AssetKey::new(self.origin_address.clone(), self.origin_chain)
    }
}

/// Which side of the bridge a transfer moves value to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    /// Value locked or burned into the bridge.
    Inbound,
    /// Value released or minted out of the bridge.
    Outbound,
}

impl FlowDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowDirection::Inbound => "inbound",
            FlowDirection::Outbound => "outbound",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEvent {
    pub direction: FlowDirection,
    #[serde(flatten)]
    pub record: TransferRecord,
}

fn serialize_amount<S: Serializer>(amount: &Option<BigUint>, s: S) -> Result<S::Ok, S::Error> {
    match amount {
        Some(a) => s.serialize_some(&a.to_string()),
        None => s.serialize_none(),
    }
}

fn deserialize_amount<'de, D: Deserializer<'de>>(d: D) -> Result<Option<BigUint>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    raw.map(|s| parse_amount(&s).map_err(serde::de::Error::custom))
        .transpose()
}

fn serialize_address<S: Serializer>(address: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("0x{}", hex::encode(address)))
}

fn deserialize_address<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
    let raw = String::deserialize(d)?;
    parse_hex_address(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::str::FromStr;

    #[test]
    fn test_key_format() {
        let key = AssetKey::new(vec![0xde, 0xad, 0xbe, 0xef], ChainId::ETHEREUM);
        assert_eq!(key.to_string(), "deadbeef-2");
        assert_eq!(AssetKey::parse("deadbeef-2"), Some(key));
    }

    #[test]
    fn test_key_format_is_injective() {
        // Pairs that would collide under naive concatenation
        let keys = [
            AssetKey::new(vec![0x01], ChainId(23)),
            AssetKey::new(vec![0x01, 0x02], ChainId(3)),
            AssetKey::new(vec![0x01, 0x23], ChainId(2)),
            AssetKey::new(vec![], ChainId(123)),
        ];
        let rendered: HashSet<String> = keys.iter().map(|k| k.cache_key()).collect();
        assert_eq!(rendered.len(), keys.len());
        for key in &keys {
            assert_eq!(AssetKey::parse(&key.cache_key()).as_ref(), Some(key));
        }
    }

    #[test]
    fn test_from_evm_matches_universal_key() {
        let token = Address::from_str("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2").unwrap();
        let record = TransferRecord::from_evm(U256::exp10(18), 18, token, ChainId::ETHEREUM);
        assert_eq!(record.asset_key(), AssetKey::from_evm(token, ChainId::ETHEREUM));
        assert_eq!(
            record.asset_key().cache_key(),
            "000000000000000000000000c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2-2"
        );
    }

    #[test]
    fn test_record_json() {
        let json = r#"{"direction":"outbound","amount":"1000000000000000000","native_decimals":18,"origin_address":"0xabcd","origin_chain":2}"#;
        let event: FlowEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.direction, FlowDirection::Outbound);
        assert_eq!(event.record.origin_address, vec![0xab, 0xcd]);
        assert_eq!(
            event.record.amount,
            Some(BigUint::from(1_000_000_000_000_000_000u64))
        );

        let absent: TransferRecord = serde_json::from_str(
            r#"{"amount":null,"native_decimals":6,"origin_address":"01","origin_chain":10002}"#,
        )
        .unwrap();
        assert_eq!(absent.amount, None);

        let missing: TransferRecord = serde_json::from_str(
            r#"{"native_decimals":6,"origin_address":"01","origin_chain":10002}"#,
        )
        .unwrap();
        assert_eq!(missing.amount, None);
    }

    #[test]
    fn test_record_json_rejects_bad_amount() {
        let result: Result<TransferRecord, _> = serde_json::from_str(
            r#"{"amount":"12abc","native_decimals":6,"origin_address":"01","origin_chain":2}"#,
        );
        assert!(result.is_err());
    }
}
