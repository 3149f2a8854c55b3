//! Yield Scout - DefiLlama pool ingest
//!
//! Pipeline:
//! 1. Fetch every pool from the yields API
//! 2. Keep target-chain pools from allow-listed protocols with TVL above the
//!    floor and a positive APY
//! 3. Rank by TVL (liquidity first, not raw APY)
//! 4. Dedupe on (protocol, asset), keeping the deepest pool
//! 5. Stop at `max_results`

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{SourceError, decode, get_body};
use crate::config::Config;
use crate::opportunity::{Opportunity, OpportunityKind};

const SERVICE: &str = "DefiLlama";

// ============================================
// API RESPONSE TYPES
// ============================================

/// Records stay raw so one malformed pool can't sink the whole list
#[derive(Debug, Deserialize)]
struct PoolsResponse {
    data: Vec<serde_json::Value>,
}

/// One pool record from the yields API
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    pub chain: String,
    pub project: String,
    pub symbol: String,
    #[serde(default)]
    pub tvl_usd: f64,
    /// DefiLlama reports null for pools without a computable yield
    #[serde(default)]
    pub apy: Option<f64>,
}

// ============================================
// POOL SOURCE
// ============================================

#[async_trait]
pub trait PoolSource: Send + Sync {
    async fn fetch_pools(&self) -> Result<Vec<PoolRecord>, SourceError>;
}

pub struct DefiLlamaClient {
    http_client: Client,
    url: String,
}

impl DefiLlamaClient {
    pub fn new(http_client: Client, url: String) -> Self {
        Self { http_client, url }
    }
}

#[async_trait]
impl PoolSource for DefiLlamaClient {
    async fn fetch_pools(&self) -> Result<Vec<PoolRecord>, SourceError> {
        debug!("Fetching yield pools from {}", self.url);
        let body = get_body(self.http_client.get(&self.url), SERVICE).await?;
        parse_pools(&body)
    }
}

/// Decode the pools envelope, dropping individual records that don't fit `PoolRecord`
fn parse_pools(body: &str) -> Result<Vec<PoolRecord>, SourceError> {
    let response: PoolsResponse = decode(body, SERVICE)?;
    let total = response.data.len();

    let pools: Vec<PoolRecord> = response
        .data
        .into_iter()
        .filter_map(|raw| serde_json::from_value(raw).ok())
        .collect();

    if pools.len() < total {
        debug!("Skipped {} malformed pool records out of {}", total - pools.len(), total);
    }
    Ok(pools)
}

// ============================================
// FILTER POLICY
// ============================================

#[derive(Debug, Clone)]
pub struct YieldPolicy {
    pub target_chain: String,
    pub allowed_protocols: Vec<String>,
    pub min_tvl_usd: f64,
    pub max_results: usize,
}

impl YieldPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            target_chain: config.target_chain.clone(),
            allowed_protocols: config.allowed_protocols.clone(),
            min_tvl_usd: config.min_tvl_usd,
            max_results: config.max_passive,
        }
    }

    fn is_allowed(&self, project: &str) -> bool {
        let project = fold(project);
        self.allowed_protocols
            .iter()
            .any(|proto| project.contains(&fold(proto)))
    }

    fn qualifies(&self, pool: &PoolRecord) -> bool {
        pool.chain == self.target_chain
            && self.is_allowed(&pool.project)
            && pool.tvl_usd > self.min_tvl_usd
            && pool.apy.unwrap_or(0.0) > 0.0
    }
}

/// Lowercase and treat spaces/underscores like the hyphens used in project slugs
fn fold(s: &str) -> String {
    s.to_lowercase().replace([' ', '_'], "-")
}

// ============================================
// PROTOCOL NORMALIZATION
// ============================================

/// (slug fragment, display name, icon)
const PROTOCOL_TABLE: &[(&str, &str, &str)] = &[
    ("aave", "Aave V3", "👻"),
    ("moonwell", "Moonwell", "🌑"),
    ("aerodrome", "Aerodrome", "✈️"),
    ("morpho", "Morpho", "🦋"),
    ("uniswap", "Uniswap", "🦄"),
];

/// Human-readable protocol name for a project slug
pub fn protocol_name(project: &str) -> String {
    let slug = project.to_lowercase();
    for (fragment, name, _) in PROTOCOL_TABLE {
        if slug.contains(fragment) {
            return name.to_string();
        }
    }

    let mut chars = project.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Icon for a project slug
pub fn protocol_icon(project: &str) -> &'static str {
    let slug = project.to_lowercase();
    PROTOCOL_TABLE
        .iter()
        .find(|(fragment, _, _)| slug.contains(fragment))
        .map(|(_, _, icon)| *icon)
        .unwrap_or("💰")
}

fn format_tvl(tvl_usd: f64) -> String {
    format!("${:.1}M", tvl_usd / 1_000_000.0)
}

// ============================================
// SELECTION
// ============================================

/// Filter, rank, dedupe and shape raw pools into passive opportunities
pub fn select_pools(pools: Vec<PoolRecord>, policy: &YieldPolicy) -> Vec<Opportunity> {
    let total = pools.len();

    let mut candidates: Vec<PoolRecord> = pools
        .into_iter()
        .filter(|p| policy.qualifies(p))
        .collect();

    debug!("{} of {} pools pass the {} filters", candidates.len(), total, policy.target_chain);

    // Liquidity first: deepest pools are the safest
    candidates.sort_by(|a, b| {
        b.tvl_usd
            .partial_cmp(&a.tvl_usd)
            .unwrap_or(Ordering::Equal)
    });

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut opportunities = Vec::new();

    for pool in candidates {
        if opportunities.len() >= policy.max_results {
            break;
        }

        let name = protocol_name(&pool.project);
        if !seen.insert((name.clone(), pool.symbol.clone())) {
            debug!(
                "Skipping duplicate {} {} (TVL {})",
                name,
                pool.symbol,
                format_tvl(pool.tvl_usd)
            );
            continue;
        }

        let apy = pool.apy.unwrap_or(0.0);
        let tvl = format_tvl(pool.tvl_usd);

        opportunities.push(Opportunity {
            id: format!("passive-live-{}", opportunities.len()),
            kind: OpportunityKind::Passive,
            icon: protocol_icon(&pool.project).to_string(),
            apy: (apy * 100.0).round() / 100.0,
            description: format!(
                "Earn {:.2}% APY on {} via {}. TVL: {}",
                apy, pool.symbol, name, tvl
            ),
            protocol: name,
            asset: pool.symbol,
            tvl: Some(tvl),
            price: None,
            change_24h: None,
            signals: None,
        });
    }

    opportunities
}

// ============================================
// YIELD SCOUT
// ============================================

/// Passive opportunity adapter. Never fails: errors degrade to an empty list.
pub struct YieldScout {
    source: Arc<dyn PoolSource>,
    policy: YieldPolicy,
}

impl YieldScout {
    pub fn new(source: Arc<dyn PoolSource>, policy: YieldPolicy) -> Self {
        Self { source, policy }
    }

    pub async fn fetch_yield_opportunities(&self) -> Vec<Opportunity> {
        let start = Instant::now();

        match self.source.fetch_pools().await {
            Ok(pools) => {
                let opportunities = select_pools(pools, &self.policy);
                info!(
                    "🛡️  Found {} live yield opportunities in {:?}",
                    opportunities.len(),
                    start.elapsed()
                );
                opportunities
            }
            Err(e) => {
                warn!("Failed to fetch yield opportunities: {}", e);
                Vec::new()
            }
        }
    }
}

// ============================================
// TESTS
// ============================================
