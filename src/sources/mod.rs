//! Upstream data sources
//!
//! Responsible for:
//! - Yield pools (DefiLlama) -> passive opportunities
//! - Spot prices (CoinGecko) -> price enrichment
//! - Cast search (Neynar) -> candidate social signals
//! - ERC-20 balanceOf reads on Base -> signal verification
//!
//! Every source reports failures as `SourceError`; callers degrade to
//! empty results instead of propagating.

mod chain;
mod price;
mod social;
mod yield_source;

pub use chain::{BalanceReader, RpcBalanceReader, to_human};
pub use price::{CoinGeckoClient, PriceFeed, PriceQuote, enrich_with_prices};
pub use social::{Cast, NeynarClient, SocialSearch};
#[cfg(test)]
pub use social::CastAuthor;
pub use yield_source::{DefiLlamaClient, PoolRecord, PoolSource, YieldPolicy, YieldScout};

use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Failure taxonomy for upstream calls
#[derive(Debug, Error)]
pub enum SourceError {
    /// Unreachable host, timeout, connection reset
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status
    #[error("{service} returned HTTP {status}")]
    Status {
        service: &'static str,
        status: StatusCode,
    },

    /// Malformed response body
    #[error("{service} returned malformed JSON: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    /// On-chain read failed
    #[error("RPC call failed: {0}")]
    Rpc(String),

    /// Credential required but not configured
    #[error("{0} credential is not configured")]
    MissingCredential(&'static str),
}

/// Build the shared HTTP client used by every JSON source
pub fn http_client(timeout: Duration) -> eyre::Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("alpha-scout/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// GET a URL and return the body, classifying failures
pub(crate) async fn get_body(
    request: reqwest::RequestBuilder,
    service: &'static str,
) -> Result<String, SourceError> {
    let response = request
        .send()
        .await
        .map_err(|source| SourceError::Http { service, source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status { service, status });
    }

    response
        .text()
        .await
        .map_err(|source| SourceError::Http { service, source })
}

/// Decode a JSON body, mapping errors to `SourceError::Parse`
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    body: &str,
    service: &'static str,
) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Parse {
        service,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_classifies_parse_errors() {
        let err = decode::<Vec<u32>>("{not json", "DefiLlama").unwrap_err();
        assert!(matches!(err, SourceError::Parse { service: "DefiLlama", .. }));
        assert!(err.to_string().contains("DefiLlama returned malformed JSON"));

        let ok: Vec<u32> = decode("[1, 2]", "DefiLlama").unwrap();
        assert_eq!(ok, vec![1, 2]);
    }

    #[test]
    fn test_status_error_message() {
        let err = SourceError::Status {
            service: "CoinGecko",
            status: StatusCode::TOO_MANY_REQUESTS,
        };
        assert_eq!(err.to_string(), "CoinGecko returned HTTP 429 Too Many Requests");
    }
}
