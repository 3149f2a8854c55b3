//! Simulated signals
//!
//! Used when no cast-search credential is configured. Each alpha opportunity
//! gets distinct personas from a fixed pool with a fresh "Nh ago" label.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::debug;

use super::SignalStrategy;
use crate::config::SignalMode;
use crate::opportunity::{Opportunity, Provenance, SocialSignal};

/// (username, avatar seed, action)
pub const PERSONAS: [(&str, &str, &str); 8] = [
    ("vitalik.eth", "vitalik", "casted: 'Base L2 scaling looks promising'"),
    ("dwr.eth", "dwr", "casted: 'Farcaster frames on $DEGEN are wild'"),
    ("jesse.xyz", "jesse", "casted: 'Building on Base is different'"),
    ("linda_p", "linda", "bought $AERO dip"),
    ("defi_chad", "chad", "longing $DEGEN with leverage"),
    ("base_god", "god", "Airdrop season is coming"),
    ("nft_collector", "nft", "minted new frames"),
    ("alpha_hunter", "hunter", "cleaning up my wallet for $AERO"),
];

pub struct SimulatedSignals {
    delay: Duration,
    picks: usize,
    seed: Option<u64>,
}

impl SimulatedSignals {
    pub fn new(delay: Duration, picks: usize) -> Self {
        Self {
            delay,
            picks,
            seed: None,
        }
    }

    /// Deterministic sampling (tests, reproducible demos)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn sample(&self, rng: &mut StdRng) -> Vec<SocialSignal> {
        PERSONAS
            .choose_multiple(&mut *rng, self.picks)
            .map(|(username, avatar, action)| SocialSignal {
                username: username.to_string(),
                avatar_url: format!("https://i.pravatar.cc/150?u={}", avatar),
                action: action.to_string(),
                time_ago: format!("{}h ago", rng.gen_range(1..=5)),
                provenance: Provenance::Simulated,
            })
            .collect()
    }
}

#[async_trait]
impl SignalStrategy for SimulatedSignals {
    fn mode(&self) -> SignalMode {
        SignalMode::Simulated
    }

    async fn apply(&self, opportunities: &mut [Opportunity]) {
        // Keep the UI timing close to the live path
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut rng = self.rng();
        for opp in opportunities.iter_mut().filter(|o| o.is_alpha()) {
            let signals = self.sample(&mut rng);
            debug!("🎲 {} simulated signals for {}", signals.len(), opp.id);
            opp.signals = Some(signals);
        }
    }
}
