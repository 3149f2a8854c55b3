//! The Scout - one aggregation pass
//!
//! Owns every adapter (constructed once at startup) and exposes the
//! entry points handed to the presentation layer:
//! - `load_opportunities()` - yield + social run concurrently, then merge
//! - `invest(id)` - simulated transaction flow
//! - `wallet_state(address)` - connection status and balances

use alloy_primitives::Address;
use eyre::{eyre, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::{Config, SignalMode};
use crate::merger::merge;
use crate::opportunity::Opportunity;
use crate::signals::{SignalStrategy, SimulatedSignals, VerifiedSignals};
use crate::social_alpha::SocialAlphaService;
use crate::sources::{
    BalanceReader, CoinGeckoClient, DefiLlamaClient, NeynarClient, RpcBalanceReader,
    YieldPolicy, YieldScout, http_client, to_human,
};
use crate::tokens::{USDC_ADDRESS, USDC_DECIMALS, tracked_tokens};

// ============================================
// INVEST FLOW
// ============================================

/// Steps of the simulated transaction flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InvestStep {
    /// Waiting for the user to sign
    Confirm,
    /// Submitted, waiting for inclusion
    Pending,
    Success,
}

impl std::fmt::Display for InvestStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvestStep::Confirm => write!(f, "CONFIRM"),
            InvestStep::Pending => write!(f, "PENDING"),
            InvestStep::Success => write!(f, "SUCCESS"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvestReceipt {
    pub opportunity_id: String,
    pub protocol: String,
    pub asset: String,
    pub steps: Vec<InvestStep>,
}

impl InvestReceipt {
    pub fn is_success(&self) -> bool {
        self.steps.last() == Some(&InvestStep::Success)
    }
}

// ============================================
// WALLET STATE
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenBalance {
    pub symbol: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletState {
    pub address: Option<Address>,
    pub status: ConnectionStatus,
    pub balances: Vec<TokenBalance>,
}

impl WalletState {
    pub fn disconnected() -> Self {
        Self {
            address: None,
            status: ConnectionStatus::Disconnected,
            balances: Vec::new(),
        }
    }
}

// ============================================
// SCOUT
// ============================================

pub struct Scout {
    yields: YieldScout,
    social: SocialAlphaService,
    balances: Arc<dyn BalanceReader>,
    /// Delay between simulated invest steps
    step_delay: Duration,
}

impl Scout {
    /// Build every adapter from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = http_client(config.http_timeout())?;
        let balances: Arc<dyn BalanceReader> = Arc::new(RpcBalanceReader::new(
            config.rpc_url.clone(),
            config.http_timeout(),
        ));

        let yields = YieldScout::new(
            Arc::new(DefiLlamaClient::new(client.clone(), config.yield_api_url.clone())),
            YieldPolicy::from_config(config),
        );

        let strategy: Box<dyn SignalStrategy> = match config.signal_mode() {
            SignalMode::Verified => Box::new(VerifiedSignals::new(
                Arc::new(NeynarClient::new(
                    client.clone(),
                    config.social_api_url.clone(),
                    config.social_api_key.clone().unwrap_or_default(),
                )),
                balances.clone(),
                tracked_tokens(),
                config.search_limit,
                config.max_signals,
            )),
            SignalMode::Simulated => Box::new(SimulatedSignals::new(
                config.simulated_delay(),
                config.max_signals,
            )),
        };

        let social = SocialAlphaService::new(
            Arc::new(CoinGeckoClient::new(client, config.price_api_url.clone())),
            strategy,
            tracked_tokens(),
        );

        Ok(Self::from_parts(yields, social, balances, Duration::from_millis(1500)))
    }

    pub fn from_parts(
        yields: YieldScout,
        social: SocialAlphaService,
        balances: Arc<dyn BalanceReader>,
        step_delay: Duration,
    ) -> Self {
        Self {
            yields,
            social,
            balances,
            step_delay,
        }
    }

    pub fn signal_mode(&self) -> SignalMode {
        self.social.mode()
    }

    /// One full aggregation pass. Never fails; worst case is an empty list.
    pub async fn load_opportunities(&self) -> Vec<Opportunity> {
        let start = Instant::now();

        let (live_yield, social) = tokio::join!(
            self.yields.fetch_yield_opportunities(),
            self.social.fetch_opportunities(),
        );

        let merged = merge(live_yield, social);
        info!(
            "📋 Loaded {} opportunities ({} passive, {} alpha) in {:?}",
            merged.len(),
            merged.iter().filter(|o| o.is_passive()).count(),
            merged.iter().filter(|o| o.is_alpha()).count(),
            start.elapsed()
        );
        merged
    }

    /// Walk the simulated transaction flow for an opportunity.
    /// Nothing is signed or broadcast.
    pub async fn invest(&self, opportunities: &[Opportunity], id: &str) -> Result<InvestReceipt> {
        let opp = opportunities
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| eyre!("Unknown opportunity id '{}'", id))?;

        info!("💸 Investing in {} ({} {})", opp.id, opp.protocol, opp.asset);

        let mut steps = Vec::new();
        for step in [InvestStep::Confirm, InvestStep::Pending, InvestStep::Success] {
            debug!("   {} → {}", opp.id, step);
            steps.push(step);
            if step != InvestStep::Success {
                tokio::time::sleep(self.step_delay).await;
            }
        }

        Ok(InvestReceipt {
            opportunity_id: opp.id.clone(),
            protocol: opp.protocol.clone(),
            asset: opp.asset.clone(),
            steps,
        })
    }

    /// Wallet overview for a connected address (USDC on Base)
    pub async fn wallet_state(&self, address: Option<Address>) -> WalletState {
        let Some(address) = address else {
            return WalletState::disconnected();
        };

        let balances = match self.balances.balance_of(USDC_ADDRESS, address).await {
            Ok(raw) => vec![TokenBalance {
                symbol: "USDC".to_string(),
                amount: to_human(raw, USDC_DECIMALS),
            }],
            Err(e) => {
                warn!("USDC balance read failed for {}: {}", address, e);
                Vec::new()
            }
        };

        WalletState {
            address: Some(address),
            status: ConnectionStatus::Connected,
            balances,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{PoolRecord, PoolSource, PriceFeed, PriceQuote, SourceError};
    use alloy_primitives::U256;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct Pools(Option<Vec<PoolRecord>>, Duration);

    #[async_trait]
    impl PoolSource for Pools {
        async fn fetch_pools(&self) -> Result<Vec<PoolRecord>, SourceError> {
            tokio::time::sleep(self.1).await;
            self.0.clone().ok_or(SourceError::Rpc("unreachable".to_string()))
        }
    }

    struct NoPrices;

    #[async_trait]
    impl PriceFeed for NoPrices {
        async fn quotes(&self, _ids: &[&str]) -> Result<HashMap<String, PriceQuote>, SourceError> {
            Err(SourceError::MissingCredential("CoinGecko"))
        }
    }

    struct Usdc(Option<U256>);

    #[async_trait]
    impl BalanceReader for Usdc {
        async fn balance_of(&self, token: Address, _holder: Address) -> Result<U256, SourceError> {
            assert_eq!(token, USDC_ADDRESS);
            self.0.ok_or(SourceError::Rpc("timeout".to_string()))
        }
    }

    fn scout(pools: Option<Vec<PoolRecord>>, pool_delay: Duration, usdc: Option<U256>) -> Scout {
        let config = Config::default();
        Scout::from_parts(
            YieldScout::new(Arc::new(Pools(pools, pool_delay)), YieldPolicy::from_config(&config)),
            SocialAlphaService::new(
                Arc::new(NoPrices),
                Box::new(SimulatedSignals::new(Duration::from_millis(100), 3)),
                tracked_tokens(),
            ),
            Arc::new(Usdc(usdc)),
            Duration::ZERO,
        )
    }

    fn base_pool(project: &str, symbol: &str, tvl_usd: f64) -> PoolRecord {
        PoolRecord {
            chain: "Base".to_string(),
            project: project.to_string(),
            symbol: symbol.to_string(),
            tvl_usd,
            apy: Some(5.0),
        }
    }

    #[tokio::test]
    async fn test_load_uses_live_yield_when_available() {
        let pools = vec![base_pool("aave-v3", "USDC", 80_000_000.0), base_pool("moonwell", "WETH", 9_000_000.0)];
        let opps = scout(Some(pools), Duration::ZERO, None).load_opportunities().await;

        let ids: Vec<_> = opps.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(&ids[..2], &["passive-live-0", "passive-live-1"]);
        assert_eq!(opps.len(), 12);
        assert!(opps[2..].iter().all(|o| o.is_alpha() && o.signal_count() == 3));
    }

    #[tokio::test]
    async fn test_load_falls_back_when_yield_fails() {
        let opps = scout(None, Duration::ZERO, None).load_opportunities().await;
        assert_eq!(opps[0].id, "passive-1");
        assert_eq!(opps.iter().filter(|o| o.is_passive()).count(), 1);
    }

    #[tokio::test]
    async fn test_adapters_run_concurrently() {
        // Both adapters sleep 100ms; sequential would take 200ms+
        let start = std::time::Instant::now();
        let opps = scout(Some(Vec::new()), Duration::from_millis(100), None)
            .load_opportunities()
            .await;
        assert!(!opps.is_empty());
        assert!(start.elapsed() < Duration::from_millis(190), "took {:?}", start.elapsed());
    }

    #[tokio::test]
    async fn test_invest_flow() {
        let scout = scout(None, Duration::ZERO, None);
        let opps = crate::opportunity::default_catalog();

        let receipt = scout.invest(&opps, "alpha-1").await.unwrap();
        assert!(receipt.is_success());
        assert_eq!(receipt.steps, vec![InvestStep::Confirm, InvestStep::Pending, InvestStep::Success]);
        assert_eq!(receipt.protocol, "Aerodrome");

        assert!(scout.invest(&opps, "nope").await.is_err());
    }

    #[test]
    fn test_invest_unknown_id_names_it() {
        let scout = scout(None, Duration::ZERO, None);
        let err = tokio_test::block_on(scout.invest(&[], "alpha-99")).unwrap_err();
        assert!(err.to_string().contains("alpha-99"));
    }

    #[tokio::test]
    async fn test_wallet_state() {
        let holder = Address::repeat_byte(0x42);

        let wallet = scout(None, Duration::ZERO, Some(U256::from(1_000_000_000u64)))
            .wallet_state(Some(holder))
            .await;
        assert_eq!(wallet.status, ConnectionStatus::Connected);
        assert_eq!(wallet.balances[0].amount, 1000.0);

        let wallet = scout(None, Duration::ZERO, None).wallet_state(Some(holder)).await;
        assert_eq!(wallet.status, ConnectionStatus::Connected);
        assert!(wallet.balances.is_empty());

        let wallet = scout(None, Duration::ZERO, None).wallet_state(None).await;
        assert_eq!(wallet.status, ConnectionStatus::Disconnected);
    }
}
