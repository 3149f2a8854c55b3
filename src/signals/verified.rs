//! Verified signals
//!
//! For every alpha opportunity:
//! 1. Resolve its tracked token
//! 2. Search recent casts for the ticker
//! 3. Check each author's first linked address with `balanceOf` (concurrently)
//! 4. Keep the first `max_signals` authors at or above the token threshold,
//!    in completion order
//!
//! An empty result never overwrites signals already on the opportunity.

use alloy_primitives::Address;
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::SignalStrategy;
use crate::config::SignalMode;
use crate::opportunity::{Opportunity, Provenance, SocialSignal, time_ago};
use crate::sources::{BalanceReader, Cast, SocialSearch, to_human};
use crate::tokens::{TrackedToken, resolve_for};

const SNIPPET_CHARS: usize = 40;
const DEFAULT_AVATAR: &str = "https://i.pravatar.cc/150";

pub struct VerifiedSignals {
    search: Arc<dyn SocialSearch>,
    balances: Arc<dyn BalanceReader>,
    registry: Vec<TrackedToken>,
    search_limit: usize,
    max_signals: usize,
}

impl VerifiedSignals {
    pub fn new(
        search: Arc<dyn SocialSearch>,
        balances: Arc<dyn BalanceReader>,
        registry: Vec<TrackedToken>,
        search_limit: usize,
        max_signals: usize,
    ) -> Self {
        Self {
            search,
            balances,
            registry,
            search_limit,
            max_signals,
        }
    }

    /// Validated signals for one opportunity (possibly empty)
    async fn signals_for(&self, opp: &Opportunity) -> Vec<SocialSignal> {
        let Some(token) = resolve_for(&self.registry, opp) else {
            return Vec::new();
        };

        let casts = match self.search.search(&token.search_query(), self.search_limit).await {
            Ok(casts) => casts,
            Err(e) => {
                warn!("Cast search for {} failed: {}", token.symbol, e);
                return Vec::new();
            }
        };

        let signals = self.verify_casts(token, casts).await;
        info!(
            "✅ {}: {} verified holder signal(s) (threshold {} {})",
            opp.id,
            signals.len(),
            token.min_balance,
            token.symbol
        );
        signals
    }

    async fn verify_casts(&self, token: &TrackedToken, casts: Vec<Cast>) -> Vec<SocialSignal> {
        let mut pending: FuturesUnordered<_> = casts
            .into_iter()
            .filter_map(|cast| {
                // Authors without a linked address can't be verified
                let holder = *cast.author.linked_addresses.first()?;
                Some(async move {
                    let holds = self.holds_enough(token, holder).await;
                    (cast, holds)
                })
            })
            .collect();

        let now = Utc::now();
        let mut signals = Vec::new();

        while let Some((cast, holds)) = pending.next().await {
            if !holds {
                continue;
            }
            signals.push(to_signal(cast, now));
            if signals.len() >= self.max_signals {
                break;
            }
        }

        signals
    }

    async fn holds_enough(&self, token: &TrackedToken, holder: Address) -> bool {
        match self.balances.balance_of(token.address, holder).await {
            Ok(raw) => {
                let balance = to_human(raw, token.decimals);
                debug!("{} holds {:.2} {}", holder, balance, token.symbol);
                balance >= token.min_balance
            }
            Err(e) => {
                debug!("Balance check for {} failed, treating as unverified: {}", holder, e);
                false
            }
        }
    }
}

fn to_signal(cast: Cast, now: chrono::DateTime<Utc>) -> SocialSignal {
    let snippet: String = cast.text.chars().take(SNIPPET_CHARS).collect();

    SocialSignal {
        username: format!("@{}", cast.author.username),
        avatar_url: cast
            .author
            .avatar_url
            .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
        action: format!("posted: \"{}...\"", snippet),
        time_ago: cast
            .timestamp
            .map(|ts| time_ago(ts, now))
            .unwrap_or_else(|| "recently".to_string()),
        provenance: Provenance::Verified,
    }
}

#[async_trait]
impl SignalStrategy for VerifiedSignals {
    fn mode(&self) -> SignalMode {
        SignalMode::Verified
    }

    async fn apply(&self, opportunities: &mut [Opportunity]) {
        let lookups = opportunities
            .iter()
            .enumerate()
            .filter(|(_, opp)| opp.is_alpha())
            .map(|(index, opp)| async move { (index, self.signals_for(opp).await) });

        let results = join_all(lookups).await;

        for (index, signals) in results {
            if signals.is_empty() {
                debug!("No verified signals for {}, keeping existing ones", opportunities[index].id);
                continue;
            }
            opportunities[index].signals = Some(signals);
        }
    }
}
