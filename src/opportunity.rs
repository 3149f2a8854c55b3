//! Opportunity model
//!
//! Opportunities are rebuilt from scratch on every aggregation pass.
//! Nothing here is cached or persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tokens::tracked_tokens;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityKind {
    /// Yield-bearing position (lending, LP)
    Passive,
    /// Social-signal-driven token play
    Alpha,
}

impl std::fmt::Display for OpportunityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpportunityKind::Passive => write!(f, "YIELD SCOUT"),
            OpportunityKind::Alpha => write!(f, "SOCIAL ALPHA"),
        }
    }
}

/// How a social signal was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Author's on-chain balance was checked against the token threshold
    Verified,
    /// Sampled from the canned persona pool
    Simulated,
    /// Shipped with the embedded catalog
    Seeded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialSignal {
    pub username: String,
    pub avatar_url: String,
    pub action: String,
    pub time_ago: String,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub kind: OpportunityKind,
    pub protocol: String,
    pub icon: String,
    pub asset: String,
    /// Annualized yield in percent; 0.0 means unknown / non-yield-bearing
    pub apy: f64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tvl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signals: Option<Vec<SocialSignal>>,
}

impl Opportunity {
    pub fn is_alpha(&self) -> bool {
        self.kind == OpportunityKind::Alpha
    }

    pub fn is_passive(&self) -> bool {
        self.kind == OpportunityKind::Passive
    }

    pub fn signal_count(&self) -> usize {
        self.signals.as_ref().map_or(0, Vec::len)
    }
}

// ============================================
// EMBEDDED CATALOG
// ============================================

fn seeded(username: &str, avatar: &str, action: &str, time_ago: &str) -> SocialSignal {
    SocialSignal {
        username: username.to_string(),
        avatar_url: format!("https://i.pravatar.cc/150?u={}", avatar),
        action: action.to_string(),
        time_ago: time_ago.to_string(),
        provenance: Provenance::Seeded,
    }
}

/// Default opportunities used when live sources are unavailable.
///
/// One passive lending position, the Aerodrome LP play, and one momentum
/// entry for every other tracked token.
pub fn default_catalog() -> Vec<Opportunity> {
    let mut catalog = vec![
        Opportunity {
            id: "passive-1".to_string(),
            kind: OpportunityKind::Passive,
            protocol: "Aave V3".to_string(),
            icon: "👻".to_string(),
            asset: "USDC".to_string(),
            apy: 4.5,
            description: "Safe, supplied liquidity on Base's leading lending protocol.".to_string(),
            tvl: Some("$50M".to_string()),
            price: None,
            change_24h: None,
            signals: None,
        },
        Opportunity {
            id: "alpha-1".to_string(),
            kind: OpportunityKind::Alpha,
            protocol: "Aerodrome".to_string(),
            icon: "✈️".to_string(),
            asset: "USDC-DAI LP".to_string(),
            apy: 12.4,
            description: "High-yield liquidity provision. Volatility risk is low (Stable-Stable).".to_string(),
            tvl: None,
            price: None,
            change_24h: None,
            signals: Some(vec![
                seeded("@crypto_guru", "crypto_guru", "Deposited 50k USDC", "4h ago"),
                seeded("@dwr.eth", "dwr", "Bridged to Base", "12h ago"),
            ]),
        },
    ];

    for token in tracked_tokens().into_iter().filter(|t| t.id != "alpha-1") {
        catalog.push(Opportunity {
            id: token.id.to_string(),
            kind: OpportunityKind::Alpha,
            protocol: token.display_name.to_string(),
            icon: "🚀".to_string(),
            asset: token.symbol.to_string(),
            apy: 0.0,
            description: format!(
                "Community momentum on ${}. Holders with {}+ {} are discussing it.",
                token.symbol, token.min_balance, token.symbol
            ),
            tvl: None,
            price: None,
            change_24h: None,
            signals: None,
        });
    }

    catalog
}

// ============================================
// HELPERS
// ============================================

/// Relative label for a cast timestamp ("5m ago", "2h ago", "3d ago")
pub fn time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds().max(0);
    if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3600)
    } else {
        format!("{}d ago", seconds / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_shape() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 11);
        assert_eq!(catalog.iter().filter(|o| o.is_passive()).count(), 1);

        let ids: HashSet<_> = catalog.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len(), "catalog ids must be unique");

        let aero = catalog.iter().find(|o| o.id == "alpha-1").unwrap();
        assert_eq!(aero.signal_count(), 2);
        assert!(aero
            .signals
            .as_ref()
            .unwrap()
            .iter()
            .all(|s| s.provenance == Provenance::Seeded));

        let degen = catalog.iter().find(|o| o.id == "alpha-2").unwrap();
        assert_eq!(degen.protocol, "Degen");
        assert_eq!(degen.apy, 0.0);
    }

    #[test]
    fn test_time_ago() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::hours(2), now), "2h ago");
        assert_eq!(time_ago(now - Duration::days(3), now), "3d ago");
        // Clock skew never produces negative labels
        assert_eq!(time_ago(now + Duration::minutes(5), now), "0m ago");
    }

    #[test]
    fn test_json_shape() {
        let catalog = default_catalog();
        let json = serde_json::to_value(&catalog[0]).unwrap();
        assert_eq!(json["kind"], "passive");
        assert_eq!(json["tvl"], "$50M");
        assert!(json.get("change24h").is_none());
        assert!(json.get("signals").is_none());
    }
}
