// src/chains.rs
//
// Chain identifier namespace and the allow-list of chains that currently have a
// transfer verifier implementation.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Numeric cross-chain identifier (Wormhole chain ID space, 16 bits wide).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u16);

impl ChainId {
    pub const SOLANA: ChainId = ChainId(1);
    pub const ETHEREUM: ChainId = ChainId(2);
    pub const SEPOLIA: ChainId = ChainId(10002);
    pub const HOLESKY: ChainId = ChainId(10006);

    /// Human-readable network name, `None` if the id is outside the known namespace.
    pub fn name(&self) -> Option<&'static str> {
        CHAIN_NAMES.get(self).copied()
    }

    pub fn from_name(name: &str) -> Option<ChainId> {
        let needle = name.trim().to_ascii_lowercase();
        KNOWN_CHAINS
            .iter()
            .find(|(_, n)| *n == needle)
            .map(|(id, _)| ChainId(*id))
    }

    pub fn is_known(&self) -> bool {
        CHAIN_NAMES.contains_key(self)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ChainId> for u16 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Every network id the namespace knows about, mainnets first.
const KNOWN_CHAINS: &[(u16, &str)] = &[
    (1, "solana"),
    (2, "ethereum"),
    (3, "terra"),
    (4, "bsc"),
    (5, "polygon"),
    (6, "avalanche"),
    (7, "oasis"),
    (8, "algorand"),
    (9, "aurora"),
    (10, "fantom"),
    (11, "karura"),
    (12, "acala"),
    (13, "klaytn"),
    (14, "celo"),
    (15, "near"),
    (16, "moonbeam"),
    (17, "neon"),
    (18, "terra2"),
    (19, "injective"),
    (20, "osmosis"),
    (21, "sui"),
    (22, "aptos"),
    (23, "arbitrum"),
    (24, "optimism"),
    (25, "gnosis"),
    (26, "pythnet"),
    (28, "xpla"),
    (29, "btc"),
    (30, "base"),
    (32, "sei"),
    (33, "rootstock"),
    (34, "scroll"),
    (35, "mantle"),
    (36, "blast"),
    (37, "xlayer"),
    (38, "linea"),
    (39, "berachain"),
    (40, "seievm"),
    (3104, "wormchain"),
    (4000, "cosmoshub"),
    (4001, "evmos"),
    (4002, "kujira"),
    (4003, "neutron"),
    (4004, "celestia"),
    (4005, "stargaze"),
    (4006, "seda"),
    (4007, "dymension"),
    (4008, "provenance"),
    (10002, "sepolia"),
    (10003, "arbitrum_sepolia"),
    (10004, "base_sepolia"),
    (10005, "optimism_sepolia"),
    (10006, "holesky"),
    (10007, "polygon_sepolia"),
];

static CHAIN_NAMES: Lazy<HashMap<ChainId, &'static str>> = Lazy::new(|| {
    KNOWN_CHAINS
        .iter()
        .map(|(id, name)| (ChainId(*id), *name))
        .collect()
});

/// Chains that have a transfer verifier implementation.
pub fn supported_chains() -> &'static [ChainId] {
    &[
        // Mainnets
        ChainId::ETHEREUM,
        // Testnets
        ChainId::SEPOLIA,
        ChainId::HOLESKY,
    ]
}

pub fn is_supported(chain: ChainId) -> bool {
    supported_chains().contains(&chain)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainValidationError {
    #[error("no chain IDs provided for transfer verification")]
    NoChainIds,
    #[error("chain id {0} exceeds u16::MAX")]
    OutOfRange(u64),
    #[error("chain id {0} is not a known chain ID")]
    UnknownChain(u16),
    #[error("chain id {0} does not have a transfer verifier implementation")]
    Unsupported(ChainId),
}

/// Validate raw chain identifiers (e.g. from a `--chain-ids` flag) against the
/// known namespace and the supported set.
///
/// Returns the identifiers in input order. Fails on the first identifier that
/// is out of range, unknown or unsupported; nothing after it is inspected.
pub fn validate_chains(input: &[u64]) -> Result<Vec<ChainId>, ChainValidationError> {
    if input.is_empty() {
        return Err(ChainValidationError::NoChainIds);
    }

    let mut enabled = Vec::with_capacity(input.len());
    for &raw in input {
        let id = u16::try_from(raw).map_err(|_| ChainValidationError::OutOfRange(raw))?;
        let chain = ChainId(id);

        if !chain.is_known() {
            return Err(ChainValidationError::UnknownChain(id));
        }
        if !is_supported(chain) {
            return Err(ChainValidationError::Unsupported(chain));
        }
        enabled.push(chain);
    }

    Ok(enabled)
}
