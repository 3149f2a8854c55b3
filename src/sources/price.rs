//! Price enrichment - CoinGecko simple price
//!
//! API: https://api.coingecko.com/api/v3/simple/price?ids=...&vs_currencies=usd&include_24hr_change=true

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, trace};

use super::{SourceError, decode, get_body};
use crate::opportunity::Opportunity;
use crate::tokens::{TrackedToken, price_id_for_protocol};

const SERVICE: &str = "CoinGecko";

/// Spot quote for one asset identifier
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceQuote {
    pub usd: f64,
    #[serde(default)]
    pub usd_24h_change: Option<f64>,
}

#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn quotes(&self, ids: &[&str]) -> Result<HashMap<String, PriceQuote>, SourceError>;
}

pub struct CoinGeckoClient {
    http_client: Client,
    url: String,
}

impl CoinGeckoClient {
    pub fn new(http_client: Client, url: String) -> Self {
        Self { http_client, url }
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoClient {
    async fn quotes(&self, ids: &[&str]) -> Result<HashMap<String, PriceQuote>, SourceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let request = self.http_client.get(&self.url).query(&[
            ("ids", ids.join(",").as_str()),
            ("vs_currencies", "usd"),
            ("include_24hr_change", "true"),
        ]);

        let body = get_body(request, SERVICE).await?;
        let quotes: HashMap<String, PriceQuote> = decode(&body, SERVICE)?;
        debug!("💲 Got {} price quotes from {}", quotes.len(), SERVICE);
        Ok(quotes)
    }
}

/// Attach price and 24h change to opportunities with a known market id
pub fn enrich_with_prices(
    opportunities: &mut [Opportunity],
    quotes: &HashMap<String, PriceQuote>,
    registry: &[TrackedToken],
) {
    for opp in opportunities.iter_mut() {
        let Some(quote) = price_id_for_protocol(registry, &opp.protocol).and_then(|id| quotes.get(id))
        else {
            continue;
        };

        trace!("Pricing {} at ${}", opp.id, quote.usd);
        opp.price = Some(format!("${}", quote.usd));
        opp.change_24h = quote.usd_24h_change.map(|c| format!("{:.2}%", c));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opportunity::default_catalog;
    use crate::tokens::tracked_tokens;

    #[test]
    fn test_parse_simple_price_body() {
        let body = r#"{"aerodrome-finance":{"usd":1.23,"usd_24h_change":-4.5678},"degen-base":{"usd":0.0081}}"#;
        let quotes: HashMap<String, PriceQuote> = decode(body, SERVICE).unwrap();
        assert_eq!(quotes["aerodrome-finance"].usd, 1.23);
        assert_eq!(quotes["degen-base"].usd_24h_change, None);
    }

    #[test]
    fn test_enrich_matches_exact_protocol_names() {
        let mut opps = default_catalog();
        let mut quotes = HashMap::new();
        quotes.insert(
            "aerodrome-finance".to_string(),
            PriceQuote { usd: 1.23, usd_24h_change: Some(-4.5678) },
        );
        quotes.insert(
            "degen-base".to_string(),
            PriceQuote { usd: 0.0081, usd_24h_change: None },
        );

        enrich_with_prices(&mut opps, &quotes, &tracked_tokens());

        let aero = opps.iter().find(|o| o.id == "alpha-1").unwrap();
        assert_eq!(aero.price.as_deref(), Some("$1.23"));
        assert_eq!(aero.change_24h.as_deref(), Some("-4.57%"));

        let degen = opps.iter().find(|o| o.id == "alpha-2").unwrap();
        assert_eq!(degen.price.as_deref(), Some("$0.0081"));
        assert_eq!(degen.change_24h, None);

        let aave = opps.iter().find(|o| o.id == "passive-1").unwrap();
        assert_eq!(aave.price, None);
    }

    #[test]
    fn test_new_registry_price_id_is_attached() {
        let mut registry = tracked_tokens();
        let brett = registry.iter_mut().find(|t| t.symbol == "BRETT").unwrap();
        brett.price_id = Some("based-brett");

        let quotes = HashMap::from([(
            "based-brett".to_string(),
            PriceQuote { usd: 0.12, usd_24h_change: Some(1.0) },
        )]);

        let mut opps = default_catalog();
        enrich_with_prices(&mut opps, &quotes, &registry);

        let brett = opps.iter().find(|o| o.id == "alpha-3").unwrap();
        assert_eq!(brett.price.as_deref(), Some("$0.12"));
        assert_eq!(brett.change_24h.as_deref(), Some("1.00%"));
    }

    #[test]
    fn test_enrich_with_no_quotes_is_noop() {
        let mut opps = default_catalog();
        let before = opps.clone();
        enrich_with_prices(&mut opps, &HashMap::new(), &tracked_tokens());
        assert_eq!(opps, before);
    }
}
