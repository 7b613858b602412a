//! Pool records and snapshots
//!
//! The refresh pipeline treats a [`Pool`] as opaque: it only counts them and
//! hands the serialized snapshot to the store. The field layout below is the
//! wire format the routing service reads back from the cache.

use serde::{Deserialize, Serialize};

/// Reference to one side of a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRef {
    pub id: String,
}

impl TokenRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Concentrated liquidity pool as reported by a V3 subgraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V3Pool {
    pub id: String,
    /// Fee in hundredths of a bip, kept as the subgraph's decimal string
    pub fee_tier: String,
    /// Active liquidity, uint128 as a decimal string
    pub liquidity: String,
    pub token0: TokenRef,
    pub token1: TokenRef,
    #[serde(rename = "tvlETH")]
    pub tvl_eth: f64,
    #[serde(rename = "tvlUSD")]
    pub tvl_usd: f64,
}

/// Constant product pair as reported by a V2 subgraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2Pool {
    pub id: String,
    pub token0: TokenRef,
    pub token1: TokenRef,
    pub supply: f64,
    /// Tracked reserve in ETH
    pub reserve: f64,
    #[serde(rename = "reserveUSD")]
    pub reserve_usd: f64,
}

/// One liquidity pool, serialized without a variant tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pool {
    V3(V3Pool),
    V2(V2Pool),
}

impl Pool {
    pub fn id(&self) -> &str {
        match self {
            Pool::V3(pool) => &pool.id,
            Pool::V2(pool) => &pool.id,
        }
    }
}

impl From<V3Pool> for Pool {
    fn from(pool: V3Pool) -> Self {
        Pool::V3(pool)
    }
}

impl From<V2Pool> for Pool {
    fn from(pool: V2Pool) -> Self {
        Pool::V2(pool)
    }
}

/// Complete set of pools returned by a single fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolSnapshot(Vec<Pool>);

impl PoolSnapshot {
    pub fn new(pools: Vec<Pool>) -> Self {
        Self(pools)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pools(&self) -> &[Pool] {
        &self.0
    }

    pub fn into_pools(self) -> Vec<Pool> {
        self.0
    }

    /// Encode as a JSON array of pool objects
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes).map(Self)
    }
}

impl From<Vec<Pool>> for PoolSnapshot {
    fn from(pools: Vec<Pool>) -> Self {
        Self(pools)
    }
}

impl FromIterator<Pool> for PoolSnapshot {
    fn from_iter<I: IntoIterator<Item = Pool>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v3_pool(id: &str) -> Pool {
        V3Pool {
            id: id.to_string(),
            fee_tier: "3000".to_string(),
            liquidity: "123456789".to_string(),
            token0: TokenRef::new("0xa0b8"),
            token1: TokenRef::new("0xc02a"),
            tvl_eth: 12.5,
            tvl_usd: 40_000.0,
        }
        .into()
    }

    fn v2_pool(id: &str) -> Pool {
        V2Pool {
            id: id.to_string(),
            token0: TokenRef::new("0x6b17"),
            token1: TokenRef::new("0xc02a"),
            supply: 1_000.25,
            reserve: 3.5,
            reserve_usd: 11_200.0,
        }
        .into()
    }

    #[test]
    fn test_v3_wire_field_names() {
        let value = serde_json::to_value(v3_pool("0xpool")).unwrap();
        assert_eq!(value["feeTier"], "3000");
        assert_eq!(value["tvlETH"], 12.5);
        assert_eq!(value["tvlUSD"], 40_000.0);
        assert_eq!(value["token0"]["id"], "0xa0b8");
        assert!(value.get("V3").is_none(), "pool must not carry a variant tag");
    }

    #[test]
    fn test_v2_wire_field_names() {
        let value = serde_json::to_value(v2_pool("0xpair")).unwrap();
        assert_eq!(value["reserveUSD"], 11_200.0);
        assert_eq!(value["supply"], 1_000.25);
        assert!(value.get("feeTier").is_none());
    }

    #[test]
    fn test_snapshot_decodes_to_matching_variants() {
        let snapshot = PoolSnapshot::new(vec![v3_pool("0x1"), v2_pool("0x2")]);
        let bytes = snapshot.to_bytes().unwrap();
        let decoded = PoolSnapshot::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, snapshot);
        assert!(matches!(decoded.pools()[0], Pool::V3(_)));
        assert!(matches!(decoded.pools()[1], Pool::V2(_)));
    }

    #[test]
    fn test_snapshot_is_a_plain_json_array() {
        let snapshot: PoolSnapshot = vec![v3_pool("0x1")].into_iter().collect();
        let text = String::from_utf8(snapshot.to_bytes().unwrap()).unwrap();
        assert!(text.starts_with('['));
        assert_eq!(snapshot.len(), 1);
        assert!(PoolSnapshot::default().is_empty());
    }

    #[test]
    fn test_snapshot_round_trips_long_decimals_exactly() {
        let mut pools: Vec<Pool> = [
            "943782070.000009254871057456",
            "0.000000000000000001",
            "12345678901234.567890123456789012",
            "3.141592653589793238",
        ]
        .iter()
        .map(|raw| {
            let value: f64 = raw.parse().unwrap();
            V2Pool {
                id: format!("0x{}", raw.len()),
                token0: TokenRef::new("0x6b17"),
                token1: TokenRef::new("0xc02a"),
                supply: value,
                reserve: value / 7.0,
                reserve_usd: value * 1_234.5,
            }
            .into()
        })
        .collect();

        // subgraph-style "{int}.{18 digits}" values
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        for i in 0..2_000 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let raw = format!("{}.{:018}", state % 10_000_000_000, state % 1_000_000_000_000_000_000);
            let value: f64 = raw.parse().unwrap();
            pools.push(
                V3Pool {
                    id: format!("0x{:x}", i),
                    fee_tier: "500".to_string(),
                    liquidity: state.to_string(),
                    token0: TokenRef::new("0xa0b8"),
                    token1: TokenRef::new("0xc02a"),
                    tvl_eth: value,
                    tvl_usd: value * 3_187.23,
                }
                .into(),
            );
        }

        let snapshot = PoolSnapshot::new(pools.clone());
        let decoded = PoolSnapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.into_pools(), pools);
    }
}
