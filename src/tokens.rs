//! Token Registry - tracked Base tokens for social alpha
//!
//! Each tracked token carries:
//! - The contract address used for `balanceOf` verification
//! - The minimum balance an author must hold for their cast to count
//! - An optional market-data identifier for price enrichment

use alloy_primitives::{Address, address};
use tracing::warn;

use crate::opportunity::Opportunity;

/// USDC on Base (used for wallet balances)
pub const USDC_ADDRESS: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

/// USDC decimals
pub const USDC_DECIMALS: u8 = 6;

/// Represents a token we're tracking social signals for
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedToken {
    /// Join key with the catalog opportunities ("alpha-1", ...)
    pub id: &'static str,
    pub display_name: &'static str,
    pub symbol: &'static str,
    pub address: Address,
    /// Human-readable balance an author must hold to be trusted
    pub min_balance: f64,
    pub decimals: u8,
    /// Market-data identifier (CoinGecko id)
    pub price_id: Option<&'static str>,
}

impl TrackedToken {
    /// Ticker query used against the cast search API
    pub fn search_query(&self) -> String {
        format!("${}", self.symbol)
    }

    /// Label shown in the feed filter bar
    pub fn label(&self) -> &'static str {
        self.symbol
    }
}

// ============================================
// TRACKED TOKENS
// ============================================

pub fn tracked_tokens() -> Vec<TrackedToken> {
    vec![
        TrackedToken {
            id: "alpha-1",
            display_name: "Aerodrome",
            symbol: "AERO",
            address: address!("940181a94a35a4569e4529a3cdfb74e38fd98631"),
            min_balance: 100.0,
            decimals: 18,
            price_id: Some("aerodrome-finance"),
        },
        TrackedToken {
            id: "alpha-2",
            display_name: "Degen",
            symbol: "DEGEN",
            address: address!("4ed4e862860bed51a9570b96d89af5e1b0efefed"),
            min_balance: 1000.0,
            decimals: 18,
            price_id: Some("degen-base"),
        },
        TrackedToken {
            id: "alpha-3",
            display_name: "Brett",
            symbol: "BRETT",
            address: address!("532f27101965dd16442e59d40670faf5ebb142e4"),
            min_balance: 100.0,
            decimals: 18,
            price_id: None,
        },
        // V2 address
        TrackedToken {
            id: "alpha-4",
            display_name: "Toshi",
            symbol: "TOSHI",
            address: address!("AC1Bd2486aAf3B5C0fc3Fd868558b082a531B2B4"),
            min_balance: 1000.0,
            decimals: 18,
            price_id: None,
        },
        // Base deployment
        TrackedToken {
            id: "alpha-5",
            display_name: "Mog Coin",
            symbol: "MOG",
            address: address!("0ba5ed329d073a847ec3d54ac767f7e099c29bb2"),
            min_balance: 100_000.0,
            decimals: 18,
            price_id: None,
        },
        TrackedToken {
            id: "alpha-6",
            display_name: "Virtual Protocol",
            symbol: "VIRTUAL",
            address: address!("0b3e328455c4059EEb9e3f84b5543F74E24e7E1b"),
            min_balance: 100.0,
            decimals: 18,
            price_id: None,
        },
        TrackedToken {
            id: "alpha-7",
            display_name: "Echelon Prime",
            symbol: "PRIME",
            address: address!("fa980ced6895ac314e7de34ef1bfae90a5add21b"),
            min_balance: 5.0,
            decimals: 18,
            price_id: None,
        },
        TrackedToken {
            id: "alpha-8",
            display_name: "Higher",
            symbol: "HIGHER",
            address: address!("0578d8a4f664a7df1a3f6a22f28b4d79a5ce0ffe"),
            min_balance: 100.0,
            decimals: 18,
            price_id: None,
        },
        TrackedToken {
            id: "alpha-9",
            display_name: "Keyboard Cat",
            symbol: "KEYCAT",
            address: address!("9a26f5433671751c3276a065f57e5a02d2817973"),
            min_balance: 1000.0,
            decimals: 18,
            price_id: None,
        },
        TrackedToken {
            id: "alpha-10",
            display_name: "Base God",
            symbol: "TYBG",
            address: address!("0d97f261b1e88845184f678e2d1e7a98d9fd38de"),
            min_balance: 10_000.0,
            decimals: 18,
            price_id: None,
        },
    ]
}

// ============================================
// LOOKUPS
// ============================================

/// Resolve the tracked token for an opportunity.
///
/// Exact keys only: opportunity id, then protocol name, then asset symbol.
/// Falls back to the first registry entry when nothing matches.
pub fn resolve_for<'a>(registry: &'a [TrackedToken], opp: &Opportunity) -> Option<&'a TrackedToken> {
    let matched = registry
        .iter()
        .find(|t| t.id == opp.id)
        .or_else(|| registry.iter().find(|t| t.display_name == opp.protocol))
        .or_else(|| registry.iter().find(|t| t.symbol == opp.asset));

    if matched.is_some() {
        return matched;
    }

    let fallback = registry.first()?;
    warn!(
        "No tracked token matches {} ({}); falling back to {}",
        opp.id, opp.protocol, fallback.symbol
    );
    Some(fallback)
}

/// Market-data identifier for a protocol display name (exact match)
pub fn price_id_for_protocol(registry: &[TrackedToken], protocol: &str) -> Option<&'static str> {
    registry
        .iter()
        .find(|t| t.display_name == protocol)
        .and_then(|t| t.price_id)
}

/// All market-data identifiers we request prices for
pub fn price_ids(registry: &[TrackedToken]) -> Vec<&'static str> {
    registry.iter().filter_map(|t| t.price_id).collect()
}

// ============================================
// TESTS
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opportunity::{Opportunity, OpportunityKind};

    fn alpha(id: &str, protocol: &str, asset: &str) -> Opportunity {
        Opportunity {
            id: id.to_string(),
            kind: OpportunityKind::Alpha,
            protocol: protocol.to_string(),
            icon: "🚀".to_string(),
            asset: asset.to_string(),
            apy: 0.0,
            description: String::new(),
            tvl: None,
            price: None,
            change_24h: None,
            signals: None,
        }
    }

    #[test]
    fn test_registry_has_unique_ids_and_symbols() {
        let registry = tracked_tokens();
        assert_eq!(registry.len(), 10);

        let mut ids: Vec<_> = registry.iter().map(|t| t.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);

        assert!(registry.iter().all(|t| t.min_balance > 0.0));
        assert!(registry.iter().all(|t| t.decimals == 18));
    }

    #[test]
    fn test_resolve_by_id_then_name_then_symbol() {
        let registry = tracked_tokens();

        let by_id = resolve_for(&registry, &alpha("alpha-2", "Something", "X")).unwrap();
        assert_eq!(by_id.symbol, "DEGEN");

        let by_name = resolve_for(&registry, &alpha("custom", "Brett", "X")).unwrap();
        assert_eq!(by_name.symbol, "BRETT");

        let by_symbol = resolve_for(&registry, &alpha("custom", "Unknown", "HIGHER")).unwrap();
        assert_eq!(by_symbol.symbol, "HIGHER");
    }

    #[test]
    fn test_resolve_falls_back_to_first_entry() {
        let registry = tracked_tokens();
        let token = resolve_for(&registry, &alpha("custom", "Nothing", "NONE")).unwrap();
        assert_eq!(token.symbol, "AERO");

        assert!(resolve_for(&[], &alpha("custom", "Nothing", "NONE")).is_none());
    }

    #[test]
    fn test_price_ids() {
        let registry = tracked_tokens();
        assert_eq!(price_id_for_protocol(&registry, "Aerodrome"), Some("aerodrome-finance"));
        assert_eq!(price_id_for_protocol(&registry, "Aerodrome Slipstream"), None);
        assert_eq!(price_id_for_protocol(&registry, "Brett"), None);
        assert_eq!(price_ids(&tracked_tokens()), vec!["aerodrome-finance", "degen-base"]);
        assert_eq!(tracked_tokens()[0].search_query(), "$AERO");
    }
}
