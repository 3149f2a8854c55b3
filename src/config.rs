//! Configuration for Alpha Scout
//!
//! All upstream endpoints, filtering thresholds and the social signal mode
//! are configured here. Values come from environment variables (with `.env`
//! support) or from a TOML file.

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================
// SIGNAL MODE
// ============================================

/// Signal mode determines where social signals come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalMode {
    /// Real cast search + on-chain balance verification
    /// Requires SOCIAL_API_KEY
    Verified,

    /// Canned persona signals with randomized timestamps
    Simulated,
}

impl Default for SignalMode {
    fn default() -> Self {
        SignalMode::Simulated
    }
}

impl std::fmt::Display for SignalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalMode::Verified => write!(f, "VERIFIED"),
            SignalMode::Simulated => write!(f, "SIMULATED"),
        }
    }
}

// ============================================
// MAIN CONFIGURATION
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ========== Network Settings ==========
    /// Base RPC URL for balanceOf reads
    pub rpc_url: String,

    /// Chain ID (8453 = Base mainnet)
    pub chain_id: u64,

    /// Chain name as reported by the yield API
    pub target_chain: String,

    // ========== Upstream APIs ==========
    /// Yield pools endpoint (DefiLlama)
    pub yield_api_url: String,

    /// Simple price endpoint (CoinGecko)
    pub price_api_url: String,

    /// Cast search endpoint (Neynar)
    pub social_api_url: String,

    /// Cast search API key; empty or missing selects simulated mode
    pub social_api_key: Option<String>,

    /// Timeout applied to every HTTP call
    pub http_timeout_secs: u64,

    // ========== Yield Filters ==========
    /// Minimum pool TVL in USD
    pub min_tvl_usd: f64,

    /// Maximum passive opportunities returned
    pub max_passive: usize,

    /// Protocol families considered safe (case-insensitive substring match)
    pub allowed_protocols: Vec<String>,

    // ========== Social Signals ==========
    /// Casts requested per token search
    pub search_limit: usize,

    /// Validated signals kept per token
    pub max_signals: usize,

    /// Artificial latency for simulated mode (milliseconds)
    pub simulated_delay_ms: u64,
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            // Network
            rpc_url: env::var("RPC_URL").unwrap_or(defaults.rpc_url),
            chain_id: env::var("CHAIN_ID")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.chain_id),
            target_chain: env::var("TARGET_CHAIN").unwrap_or(defaults.target_chain),

            // Upstream APIs
            yield_api_url: env::var("YIELD_API_URL").unwrap_or(defaults.yield_api_url),
            price_api_url: env::var("PRICE_API_URL").unwrap_or(defaults.price_api_url),
            social_api_url: env::var("SOCIAL_API_URL").unwrap_or(defaults.social_api_url),
            social_api_key: env::var("SOCIAL_API_KEY").ok(),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.http_timeout_secs),

            // Yield filters
            min_tvl_usd: env::var("MIN_TVL_USD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_tvl_usd),
            max_passive: env::var("MAX_PASSIVE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_passive),
            allowed_protocols: env::var("ALLOWED_PROTOCOLS")
                .map(|s| s.split(',').map(|p| p.trim().to_string()).collect())
                .unwrap_or(defaults.allowed_protocols),

            // Social signals
            search_limit: env::var("SEARCH_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.search_limit),
            max_signals: env::var("MAX_SIGNALS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_signals),
            simulated_delay_ms: env::var("SIMULATED_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.simulated_delay_ms),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Default protocol allow-list (Base blue chips)
    fn default_allowed_protocols() -> Vec<String> {
        vec![
            "Aave V3".to_string(),
            "Moonwell".to_string(),
            "Aerodrome".to_string(),
            "Morpho".to_string(),
            "Aerodrome Slipstream".to_string(),
            "Uniswap V3".to_string(),
        ]
    }

    /// Social signal mode, decided once from credential presence
    pub fn signal_mode(&self) -> SignalMode {
        match self.social_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => SignalMode::Verified,
            _ => SignalMode::Simulated,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.is_empty() || self.rpc_url.contains("YOUR_API_KEY") {
            return Err(eyre::eyre!("Invalid RPC_URL - please set a valid Base RPC URL"));
        }

        for (name, url) in [
            ("YIELD_API_URL", &self.yield_api_url),
            ("PRICE_API_URL", &self.price_api_url),
            ("SOCIAL_API_URL", &self.social_api_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(eyre::eyre!("{} must be an http(s) URL (got '{}')", name, url));
            }
        }

        if self.min_tvl_usd < 0.0 {
            return Err(eyre::eyre!(
                "MIN_TVL_USD must be non-negative (currently {:.0})",
                self.min_tvl_usd
            ));
        }
        if self.max_passive == 0 {
            return Err(eyre::eyre!("MAX_PASSIVE must be at least 1"));
        }
        if self.allowed_protocols.is_empty() {
            return Err(eyre::eyre!("ALLOWED_PROTOCOLS must not be empty"));
        }
        if self.max_signals == 0 || self.max_signals > self.search_limit {
            return Err(eyre::eyre!(
                "MAX_SIGNALS must be between 1 and SEARCH_LIMIT ({}), currently {}",
                self.search_limit,
                self.max_signals
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(eyre::eyre!("HTTP_TIMEOUT_SECS must be at least 1"));
        }

        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              ALPHA SCOUT - CONFIGURATION                   ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ Signal Mode:       {:^40} ║", self.signal_mode());
        println!("║ Chain:             {:^40} ║", format!("{} ({})", self.target_chain, self.chain_id));
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ YIELD SCOUT                                                ║");
        println!("║ • Min TVL:         ${:<38.0} ║", self.min_tvl_usd);
        println!("║ • Max Results:     {:^40} ║", self.max_passive);
        println!("║ • Protocols:       {:^40} ║", self.allowed_protocols.len());
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ SOCIAL ALPHA                                               ║");
        println!("║ • Search Limit:    {:^40} ║", self.search_limit);
        println!("║ • Max Signals:     {:^40} ║", self.max_signals);
        println!("║ • Social API Key:  {:^40} ║",
            if self.signal_mode() == SignalMode::Verified { "✓ Configured" } else { "✗ Simulated" }
        );
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "https://mainnet.base.org".to_string(),
            chain_id: 8453,
            target_chain: "Base".to_string(),
            yield_api_url: "https://yields.llama.fi/pools".to_string(),
            price_api_url: "https://api.coingecko.com/api/v3/simple/price".to_string(),
            social_api_url: "https://api.neynar.com/v2/farcaster/cast/search".to_string(),
            social_api_key: None,
            http_timeout_secs: 10,
            min_tvl_usd: 1_000_000.0,
            max_passive: 10,
            allowed_protocols: Self::default_allowed_protocols(),
            search_limit: 15,
            max_signals: 3,
            simulated_delay_ms: 800,
        }
    }
}

// ============================================
// TESTS
// ============================================
