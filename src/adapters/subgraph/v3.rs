//! V3 Subgraph Provider
//!
//! Pages through `pools` on a concentrated liquidity subgraph and keeps the
//! pools the router can actually use.

use std::time::Instant;
use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{InvocationContext, Pool, PoolSnapshot, TokenRef, V3Pool};
use crate::ports::{PoolProvider, ProviderError};
use super::client::{parse_decimal, SubgraphClient, SubgraphEntity};

const POOLS_QUERY: &str = r#"
query getPools($pageSize: Int!, $lastId: String!) {
  pools(first: $pageSize, where: { id_gt: $lastId }, orderBy: id, orderDirection: asc) {
    id
    token0 { id symbol }
    token1 { id symbol }
    feeTier
    liquidity
    totalValueLockedUSD
    totalValueLockedETH
  }
}
"#;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawToken {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawV3Pool {
    pub id: String,
    pub token0: RawToken,
    pub token1: RawToken,
    pub fee_tier: String,
    pub liquidity: String,
    #[serde(rename = "totalValueLockedUSD")]
    pub total_value_locked_usd: String,
    #[serde(rename = "totalValueLockedETH")]
    pub total_value_locked_eth: String,
}

impl SubgraphEntity for RawV3Pool {
    fn id(&self) -> &str {
        &self.id
    }
}

impl RawV3Pool {
    /// Convert to the cached shape, or `None` if the pool should be dropped.
    /// A pool is kept when it has active liquidity or enough tracked TVL.
    pub(crate) fn into_pool(self, tracked_eth_threshold: f64) -> Result<Option<Pool>, ProviderError> {
        let tvl_eth = parse_decimal("totalValueLockedETH", &self.total_value_locked_eth)?;
        let tvl_usd = parse_decimal("totalValueLockedUSD", &self.total_value_locked_usd)?;
        let has_liquidity = !self.liquidity.trim().trim_start_matches('0').is_empty();

        if !has_liquidity && tvl_eth <= tracked_eth_threshold {
            return Ok(None);
        }

        Ok(Some(
            V3Pool {
                id: self.id.to_lowercase(),
                fee_tier: self.fee_tier,
                liquidity: self.liquidity,
                token0: TokenRef::new(self.token0.id.to_lowercase()),
                token1: TokenRef::new(self.token1.id.to_lowercase()),
                tvl_eth,
                tvl_usd,
            }
            .into(),
        ))
    }
}

pub struct V3SubgraphProvider {
    client: SubgraphClient,
    tracked_eth_threshold: f64,
}

impl V3SubgraphProvider {
    pub fn new(client: SubgraphClient, tracked_eth_threshold: f64) -> Self {
        Self {
            client,
            tracked_eth_threshold,
        }
    }
}

#[async_trait]
impl PoolProvider for V3SubgraphProvider {
    async fn fetch_pools(
        &self,
        ctx: &InvocationContext,
    ) -> Result<Option<PoolSnapshot>, ProviderError> {
        let started = Instant::now();
        tracing::info!(
            parent: ctx.span(),
            subgraph = %self.client.url(),
            page_size = self.client.page_size(),
            "Getting V3 pools from the subgraph"
        );

        let Some(raw) = self.client.fetch_all::<RawV3Pool>(ctx, POOLS_QUERY, "pools").await? else {
            tracing::warn!(parent: ctx.span(), "V3 subgraph returned no data");
            return Ok(None);
        };

        let fetched = raw.len();
        let mut pools = Vec::with_capacity(fetched);
        for entity in raw {
            if let Some(pool) = entity.into_pool(self.tracked_eth_threshold)? {
                pools.push(pool);
            }
        }

        tracing::info!(
            parent: ctx.span(),
            fetched,
            kept = pools.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Got V3 pools from the subgraph"
        );

        Ok(Some(PoolSnapshot::new(pools)))
    }

    fn describe(&self) -> String {
        format!("v3-subgraph({})", self.client.url().host_str().unwrap_or("unknown"))
    }
}
