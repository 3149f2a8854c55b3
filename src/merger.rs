//! Opportunity Merger
//!
//! - Alpha items always come from the social alpha service
//! - Passive items come from the live yield scout, or from the social alpha
//!   service's embedded defaults when the yield scout returned nothing
//! - Passive first, then alpha; each adapter's own order is preserved

use tracing::{debug, info};

use crate::opportunity::Opportunity;
use crate::tokens::tracked_tokens;

/// Combine both adapters' output into the displayed list. Never fails.
pub fn merge(live_yield: Vec<Opportunity>, social: Vec<Opportunity>) -> Vec<Opportunity> {
    let (embedded_passive, alpha): (Vec<_>, Vec<_>) =
        social.into_iter().partition(Opportunity::is_passive);

    let passive = if live_yield.is_empty() {
        if !embedded_passive.is_empty() {
            info!("Yield scout returned nothing; using {} embedded passive opportunities", embedded_passive.len());
        }
        embedded_passive
    } else {
        debug!("Using {} live passive opportunities", live_yield.len());
        live_yield.into_iter().filter(Opportunity::is_passive).collect()
    };

    let mut merged = passive;
    merged.extend(alpha.into_iter().filter(Opportunity::is_alpha));
    merged
}

/// Alpha feed filter: "ALL", a tracked ticker or name (AERO, Degen), or free text
/// matched case-insensitively against protocol and asset
pub fn alpha_feed<'a>(opportunities: &'a [Opportunity], label: &str) -> Vec<&'a Opportunity> {
    let label = label.trim();
    let all = label.eq_ignore_ascii_case("ALL");

    let registry = tracked_tokens();
    let token = registry.iter().find(|t| {
        t.symbol.eq_ignore_ascii_case(label) || t.display_name.eq_ignore_ascii_case(label)
    });
    let needle = label.to_lowercase();

    opportunities
        .iter()
        .filter(|o| o.is_alpha())
        .filter(|o| {
            if all {
                return true;
            }
            match token {
                Some(t) => o.id == t.id || o.protocol == t.display_name,
                None => {
                    o.protocol.to_lowercase().contains(&needle)
                        || o.asset.to_lowercase().contains(&needle)
                }
            }
        })
        .collect()
}
