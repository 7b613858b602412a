//! V2 Subgraph Provider
//!
//! Pages through `pairs` on a constant product subgraph. Pairs need either
//! tracked ETH reserves or a large untracked USD reserve to be cached.

use std::time::Instant;
use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{InvocationContext, Pool, PoolSnapshot, TokenRef, V2Pool};
use crate::ports::{PoolProvider, ProviderError};
use super::client::{parse_decimal, SubgraphClient, SubgraphEntity};
use super::v3::RawToken;

const PAIRS_QUERY: &str = r#"
query getPairs($pageSize: Int!, $lastId: String!) {
  pairs(first: $pageSize, where: { id_gt: $lastId }, orderBy: id, orderDirection: asc) {
    id
    token0 { id symbol }
    token1 { id symbol }
    totalSupply
    trackedReserveETH
    reserveETH
    reserveUSD
  }
}
"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawV2Pair {
    pub id: String,
    pub token0: RawToken,
    pub token1: RawToken,
    pub total_supply: String,
    #[serde(rename = "trackedReserveETH")]
    pub tracked_reserve_eth: String,
    #[serde(rename = "reserveUSD")]
    pub reserve_usd: String,
}

impl SubgraphEntity for RawV2Pair {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Minimum reserves for a pair to be kept
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct V2Thresholds {
    pub tracked_eth: f64,
    pub untracked_usd: f64,
}

impl RawV2Pair {
    pub(crate) fn into_pool(self, thresholds: V2Thresholds) -> Result<Option<Pool>, ProviderError> {
        let supply = parse_decimal("totalSupply", &self.total_supply)?;
        let reserve = parse_decimal("trackedReserveETH", &self.tracked_reserve_eth)?;
        let reserve_usd = parse_decimal("reserveUSD", &self.reserve_usd)?;

        if reserve <= thresholds.tracked_eth && reserve_usd <= thresholds.untracked_usd {
            return Ok(None);
        }

        Ok(Some(
            V2Pool {
                id: self.id.to_lowercase(),
                token0: TokenRef::new(self.token0.id.to_lowercase()),
                token1: TokenRef::new(self.token1.id.to_lowercase()),
                supply,
                reserve,
                reserve_usd,
            }
            .into(),
        ))
    }
}

pub struct V2SubgraphProvider {
    client: SubgraphClient,
    thresholds: V2Thresholds,
}

impl V2SubgraphProvider {
    pub fn new(client: SubgraphClient, thresholds: V2Thresholds) -> Self {
        Self { client, thresholds }
    }
}

#[async_trait]
impl PoolProvider for V2SubgraphProvider {
    async fn fetch_pools(
        &self,
        ctx: &InvocationContext,
    ) -> Result<Option<PoolSnapshot>, ProviderError> {
        let started = Instant::now();
        tracing::info!(
            parent: ctx.span(),
            subgraph = %self.client.url(),
            page_size = self.client.page_size(),
            "Getting V2 pairs from the subgraph"
        );

        let Some(raw) = self.client.fetch_all::<RawV2Pair>(ctx, PAIRS_QUERY, "pairs").await? else {
            tracing::warn!(parent: ctx.span(), "V2 subgraph returned no data");
            return Ok(None);
        };

        let fetched = raw.len();
        let pools = raw
            .into_iter()
            .filter_map(|pair| pair.into_pool(self.thresholds).transpose())
            .collect::<Result<Vec<Pool>, ProviderError>>()?;

        tracing::info!(
            parent: ctx.span(),
            fetched,
            kept = pools.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Got V2 pairs from the subgraph"
        );

        Ok(Some(PoolSnapshot::new(pools)))
    }

    fn describe(&self) -> String {
        format!("v2-subgraph({})", self.client.url().host_str().unwrap_or("unknown"))
    }
}
