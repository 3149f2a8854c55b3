//! Cast search - Neynar Farcaster API
//!
//! API: https://api.neynar.com/v2/farcaster/cast/search?q=$AERO&limit=15
//! Auth: `x-api-key` header

use alloy_primitives::Address;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

use super::{SourceError, decode, get_body};

const SERVICE: &str = "Neynar";

// ============================================
// DOMAIN TYPES
// ============================================

#[derive(Debug, Clone, PartialEq)]
pub struct CastAuthor {
    pub username: String,
    pub avatar_url: Option<String>,
    /// Verified on-chain addresses, in the order the API lists them
    pub linked_addresses: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cast {
    pub author: CastAuthor,
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait SocialSearch: Send + Sync {
    /// Most recent casts matching `query`, at most `limit`
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Cast>, SourceError>;
}

// ============================================
// API RESPONSE TYPES
// ============================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    casts: Vec<RawCast>,
}

#[derive(Debug, Deserialize)]
struct RawCast {
    #[serde(default)]
    text: String,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    author: RawAuthor,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    pfp_url: Option<String>,
    #[serde(default)]
    verified_addresses: Option<VerifiedAddresses>,
}

#[derive(Debug, Default, Deserialize)]
struct VerifiedAddresses {
    #[serde(default)]
    eth_addresses: Vec<String>,
}

impl From<RawCast> for Cast {
    fn from(raw: RawCast) -> Self {
        let linked_addresses = raw
            .author
            .verified_addresses
            .unwrap_or_default()
            .eth_addresses
            .iter()
            .filter_map(|a| Address::from_str(a).ok())
            .collect();

        Cast {
            author: CastAuthor {
                username: raw.author.username.unwrap_or_else(|| "anon".to_string()),
                avatar_url: raw.author.pfp_url,
                linked_addresses,
            },
            text: raw.text,
            timestamp: raw.timestamp,
        }
    }
}

fn parse_search_body(body: &str) -> Result<Vec<Cast>, SourceError> {
    let response: SearchResponse = decode(body, SERVICE)?;
    Ok(response.result.casts.into_iter().map(Cast::from).collect())
}

// ============================================
// NEYNAR CLIENT
// ============================================

pub struct NeynarClient {
    http_client: Client,
    url: String,
    api_key: String,
}

impl NeynarClient {
    pub fn new(http_client: Client, url: String, api_key: String) -> Self {
        Self { http_client, url, api_key }
    }
}

#[async_trait]
impl SocialSearch for NeynarClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Cast>, SourceError> {
        if self.api_key.trim().is_empty() {
            return Err(SourceError::MissingCredential(SERVICE));
        }

        let request = self
            .http_client
            .get(&self.url)
            .header("x-api-key", &self.api_key)
            .query(&[("q", query.to_string()), ("limit", limit.to_string())]);

        let body = get_body(request, SERVICE).await?;
        let casts = parse_search_body(&body)?;
        debug!("🔎 {} returned {} casts for '{}'", SERVICE, casts.len(), query);
        Ok(casts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_body() {
        let body = r#"{"result":{"casts":[
            {"text":"aping $AERO","timestamp":"2024-06-01T12:00:00.000Z",
             "author":{"username":"whale","pfp_url":"https://img/whale.png",
                       "verified_addresses":{"eth_addresses":["0x940181a94a35a4569e4529a3cdfb74e38fd98631","not-an-address"]}}},
            {"text":"no wallet","author":{"username":"lurker"}},
            {"text":"","author":{}}
        ],"next":{"cursor":null}}}"#;

        let casts = parse_search_body(body).unwrap();
        assert_eq!(casts.len(), 3);

        assert_eq!(casts[0].author.username, "whale");
        assert_eq!(casts[0].author.linked_addresses.len(), 1);
        assert!(casts[0].timestamp.is_some());

        assert!(casts[1].author.linked_addresses.is_empty());
        assert_eq!(casts[1].timestamp, None);

        assert_eq!(casts[2].author.username, "anon");
        assert_eq!(casts[2].author.avatar_url, None);
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        let err = parse_search_body(r#"{"casts":[]}"#).unwrap_err();
        assert!(matches!(err, SourceError::Parse { service: "Neynar", .. }));
    }

    #[tokio::test]
    async fn test_empty_key_is_missing_credential() {
        let client = NeynarClient::new(Client::new(), "http://127.0.0.1:9".to_string(), String::new());
        let err = client.search("$AERO", 15).await.unwrap_err();
        assert!(matches!(err, SourceError::MissingCredential("Neynar")));
    }
}
