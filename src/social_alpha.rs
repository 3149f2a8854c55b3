//! Social Alpha - catalog + prices + social signals
//!
//! Produces both kinds of opportunity: the embedded passive defaults (used
//! only when the live yield scout comes back empty) and the alpha plays with
//! their signals attached.

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::SignalMode;
use crate::opportunity::{Opportunity, default_catalog};
use crate::signals::SignalStrategy;
use crate::sources::{PriceFeed, enrich_with_prices};
use crate::tokens::{TrackedToken, price_ids};

pub struct SocialAlphaService {
    prices: Arc<dyn PriceFeed>,
    strategy: Box<dyn SignalStrategy>,
    registry: Vec<TrackedToken>,
}

impl SocialAlphaService {
    pub fn new(
        prices: Arc<dyn PriceFeed>,
        strategy: Box<dyn SignalStrategy>,
        registry: Vec<TrackedToken>,
    ) -> Self {
        Self {
            prices,
            strategy,
            registry,
        }
    }

    pub fn mode(&self) -> SignalMode {
        self.strategy.mode()
    }

    /// Never fails: a missing price feed or signal source degrades the
    /// result instead of emptying it.
    pub async fn fetch_opportunities(&self) -> Vec<Opportunity> {
        let start = Instant::now();
        let mut opportunities = default_catalog();

        let ids = price_ids(&self.registry);
        match self.prices.quotes(&ids).await {
            Ok(quotes) => enrich_with_prices(&mut opportunities, &quotes, &self.registry),
            Err(e) => warn!("Price fetch failed, continuing without prices: {}", e),
        }

        self.strategy.apply(&mut opportunities).await;

        info!(
            "🚀 Social alpha ready ({} mode): {} opportunities in {:?}",
            self.mode(),
            opportunities.len(),
            start.elapsed()
        );
        opportunities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opportunity::Provenance;
    use crate::signals::SimulatedSignals;
    use crate::sources::{PriceQuote, SourceError};
    use crate::tokens::tracked_tokens;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    struct FixedPrices(Option<HashMap<String, PriceQuote>>);

    #[async_trait]
    impl PriceFeed for FixedPrices {
        async fn quotes(&self, _ids: &[&str]) -> Result<HashMap<String, PriceQuote>, SourceError> {
            self.0.clone().ok_or(SourceError::Parse {
                service: "CoinGecko",
                message: "expected value at line 1 column 1".to_string(),
            })
        }
    }

    fn service(prices: Option<HashMap<String, PriceQuote>>) -> SocialAlphaService {
        SocialAlphaService::new(
            Arc::new(FixedPrices(prices)),
            Box::new(SimulatedSignals::new(Duration::ZERO, 3).with_seed(42)),
            tracked_tokens(),
        )
    }

    #[tokio::test]
    async fn test_simulated_pass_with_prices() {
        let quotes = HashMap::from([(
            "aerodrome-finance".to_string(),
            PriceQuote { usd: 1.5, usd_24h_change: Some(3.0) },
        )]);

        let opps = service(Some(quotes)).fetch_opportunities().await;

        assert_eq!(opps.iter().filter(|o| o.is_passive()).count(), 1);
        let aero = opps.iter().find(|o| o.id == "alpha-1").unwrap();
        assert_eq!(aero.price.as_deref(), Some("$1.5"));
        assert_eq!(aero.change_24h.as_deref(), Some("3.00%"));

        for opp in opps.iter().filter(|o| o.is_alpha()) {
            let signals = opp.signals.as_ref().unwrap();
            assert_eq!(signals.len(), 3);
            assert!(signals.iter().all(|s| s.provenance == Provenance::Simulated));
        }
    }

    #[tokio::test]
    async fn test_price_failure_degrades_silently() {
        let svc = service(None);
        assert_eq!(svc.mode(), SignalMode::Simulated);

        let opps = svc.fetch_opportunities().await;
        assert_eq!(opps.len(), default_catalog().len());
        assert!(opps.iter().all(|o| o.price.is_none() && o.change_24h.is_none()));
    }
}
