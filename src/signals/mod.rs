//! Social signal strategies
//!
//! Exactly one strategy is active per process, chosen from configuration:
//! - `VerifiedSignals`: cast search + on-chain balance gate
//! - `SimulatedSignals`: canned personas, randomized timestamps

mod simulated;
mod verified;

pub use simulated::SimulatedSignals;
pub use verified::VerifiedSignals;

use async_trait::async_trait;

use crate::config::SignalMode;
use crate::opportunity::Opportunity;

#[async_trait]
pub trait SignalStrategy: Send + Sync {
    fn mode(&self) -> SignalMode;

    /// Attach social signals to the alpha opportunities in place.
    /// Passive opportunities are never touched.
    async fn apply(&self, opportunities: &mut [Opportunity]);
}
