//! On-chain balance reads (Base)
//!
//! A single `balanceOf` eth_call per holder. No batching, no caching.

use alloy_primitives::utils::format_units;
use alloy_primitives::{Address, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

use super::SourceError;

sol! {
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
    }
}

#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// Raw (unscaled) token balance of `holder`
    async fn balance_of(&self, token: Address, holder: Address) -> Result<U256, SourceError>;
}

pub struct RpcBalanceReader {
    rpc_url: String,
    /// Upper bound on one eth_call, connection included
    timeout: Duration,
}

impl RpcBalanceReader {
    pub fn new(rpc_url: String, timeout: Duration) -> Self {
        Self { rpc_url, timeout }
    }

    async fn call_balance_of(&self, token: Address, holder: Address) -> Result<U256, SourceError> {
        let url = self
            .rpc_url
            .parse::<reqwest::Url>()
            .map_err(|e| SourceError::Rpc(format!("invalid RPC URL '{}': {}", self.rpc_url, e)))?;
        let provider = ProviderBuilder::new().connect_http(url);

        let calldata = IERC20::balanceOfCall { owner: holder }.abi_encode();
        let tx = TransactionRequest::default()
            .to(token)
            .input(calldata.into());

        let output = provider
            .call(tx)
            .await
            .map_err(|e| SourceError::Rpc(format!("balanceOf({}) on {}: {}", holder, token, e)))?;

        let balance = IERC20::balanceOfCall::abi_decode_returns(&output)
            .map_err(|e| SourceError::Rpc(format!("failed to decode balanceOf: {}", e)))?;

        trace!("balanceOf({}) on {} = {}", holder, token, balance);
        Ok(balance)
    }
}

#[async_trait]
impl BalanceReader for RpcBalanceReader {
    async fn balance_of(&self, token: Address, holder: Address) -> Result<U256, SourceError> {
        tokio::time::timeout(self.timeout, self.call_balance_of(token, holder))
            .await
            .map_err(|_| {
                SourceError::Rpc(format!(
                    "balanceOf({}) on {} timed out after {:?}",
                    holder, token, self.timeout
                ))
            })?
    }
}

/// Scale a raw integer balance to a human-readable amount
pub fn to_human(raw: U256, decimals: u8) -> f64 {
    format_units(raw, decimals)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0)
}
