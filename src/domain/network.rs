//! Network identifiers
//!
//! A network is the blockchain a snapshot is built for, addressed by its
//! numeric chain id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric chain identifier (EIP-155 chain id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(u64);

impl NetworkId {
    pub const MAINNET: NetworkId = NetworkId(1);
    pub const OPTIMISM: NetworkId = NetworkId(10);
    pub const BNB: NetworkId = NetworkId(56);
    pub const POLYGON: NetworkId = NetworkId(137);
    pub const BASE: NetworkId = NetworkId(8453);
    pub const ARBITRUM: NetworkId = NetworkId(42161);
    pub const CELO: NetworkId = NetworkId(42220);
    pub const AVALANCHE: NetworkId = NetworkId(43114);
    pub const SEPOLIA: NetworkId = NetworkId(11155111);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(&self) -> u64 {
        self.0
    }

    /// Human readable name for well-known chains
    pub fn name(&self) -> Option<&'static str> {
        match *self {
            Self::MAINNET => Some("mainnet"),
            Self::OPTIMISM => Some("optimism"),
            Self::BNB => Some("bnb"),
            Self::POLYGON => Some("polygon"),
            Self::BASE => Some("base"),
            Self::ARBITRUM => Some("arbitrum"),
            Self::CELO => Some("celo"),
            Self::AVALANCHE => Some("avalanche"),
            Self::SEPOLIA => Some("sepolia"),
            _ => None,
        }
    }
}

impl From<u64> for NetworkId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Always the bare number: the display form is part of the snapshot key.
impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NetworkId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}
