//! Alpha Scout - DeFi Opportunity Aggregator for Base
//!
//! Run with: cargo run -- [--token DEGEN] [--json]
//!
//! One aggregation pass:
//! - Yield Scout: live pools from the yield API (filtered, deduped, ranked)
//! - Social Alpha: tracked tokens with prices and social signals
//! - Merge, then print both sections (or JSON)

use alloy_primitives::Address;
use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use console::style;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod merger;
mod opportunity;
mod scout;
mod signals;
mod social_alpha;
mod sources;
mod tokens;

use config::Config;
use merger::alpha_feed;
use opportunity::Opportunity;
use scout::{ConnectionStatus, InvestReceipt, Scout, WalletState};
use tokens::tracked_tokens;

/// Alpha Scout - yield opportunities and social alpha on Base
#[derive(Parser, Debug)]
#[command(name = "alpha-scout", version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Load configuration from a TOML file instead of the environment
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Alpha feed filter: ALL or a token label (e.g. DEGEN, Aerodrome)
    #[arg(short, long, value_name = "LABEL", default_value = "ALL")]
    token: String,

    /// Print the merged list as JSON
    #[arg(long)]
    json: bool,

    /// Run the simulated invest flow for an opportunity id
    #[arg(long, value_name = "ID")]
    invest: Option<String>,

    /// Show wallet state for an address
    #[arg(long, value_name = "ADDRESS")]
    wallet: Option<String>,

    /// Write the effective configuration to a TOML file
    #[arg(long, value_name = "FILE")]
    save_config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    mode: String,
    passive: Vec<&'a Opportunity>,
    alpha: Vec<&'a Opportunity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invest: Option<InvestReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wallet: Option<WalletState>,
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" 🔭 ALPHA SCOUT - DeFi Opportunity Aggregator").cyan().bold()
    );
    println!(
        "{}",
        style("    Yield Scout | Social Alpha | Base").cyan()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

/// One display line per opportunity
fn describe(opp: &Opportunity) -> String {
    let mut line = format!("{} {} | {}", opp.icon, opp.protocol, opp.asset);

    if opp.apy > 0.0 {
        line.push_str(&format!(" | APY {:.2}%", opp.apy));
    }
    if let Some(tvl) = &opp.tvl {
        line.push_str(&format!(" | TVL {}", tvl));
    }
    if let Some(price) = &opp.price {
        line.push_str(&format!(" | {}", price));
        if let Some(change) = &opp.change_24h {
            line.push_str(&format!(" ({})", change));
        }
    }
    line
}

fn print_section(title: &str, items: &[&Opportunity]) {
    println!();
    println!("{}", style(format!("═══ {} ═══", title)).blue().bold());
    println!();

    if items.is_empty() {
        println!("  {}", style("No opportunities found").yellow());
        return;
    }

    for (i, opp) in items.iter().enumerate() {
        println!("  {}. {}", i + 1, describe(opp));
        if opp.is_passive() {
            println!("     {}", style(&opp.description).dim());
        } else if opp.signal_count() > 0 {
            println!("     {}", style(format!("{} social signal(s)", opp.signal_count())).dim());
        }
        for signal in opp.signals.iter().flatten() {
            println!(
                "     {} {} {} {}",
                style("•").magenta(),
                style(&signal.username).cyan(),
                signal.action,
                style(format!("({})", signal.time_ago)).dim()
            );
        }
    }
}

fn print_invest(receipt: &InvestReceipt) {
    println!();
    println!("{}", style("═══ INVEST (SIMULATED) ═══").yellow().bold());
    println!();
    for step in &receipt.steps {
        println!("  {} {}", style("→").yellow(), step);
    }
    if receipt.is_success() {
        println!(
            "{} {} {} - no transaction was signed or broadcast",
            style("✓").green(),
            receipt.protocol,
            receipt.asset
        );
    }
}

fn print_wallet(wallet: &WalletState) {
    println!();
    println!("{}", style("═══ WALLET ═══").green().bold());
    println!();
    match (wallet.status, wallet.address) {
        (ConnectionStatus::Connected, Some(address)) => {
            println!("  {} {}", style("Connected:").green(), address);
            if wallet.balances.is_empty() {
                println!("  {}", style("Balances unavailable").yellow());
            }
            for balance in &wallet.balances {
                println!("  {:.2} {}", balance.amount, balance.symbol);
            }
        }
        _ => println!("  {}", style("Disconnected").yellow()),
    }
}

/// Feed filter labels: ALL plus every tracked ticker
fn filter_labels() -> Vec<&'static str> {
    std::iter::once("ALL")
        .chain(tracked_tokens().iter().map(|t| t.label()))
        .collect()
}

fn parse_address(raw: &str) -> Result<Address> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| eyre!("Invalid wallet address '{}': {}", raw, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let directive = if args.verbose { "alpha_scout=debug" } else { "alpha_scout=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        error!("Please check your .env file or --config");
        return Err(e);
    }

    if let Some(path) = &args.save_config {
        config.save_to_file(path)?;
        info!("Configuration written to {}", path.display());
    }

    if !args.json {
        print_banner();
        config.print_summary();
    }

    let wallet_address = args.wallet.as_deref().map(parse_address).transpose()?;

    let scout = Scout::new(&config)?;
    info!("Signal mode: {}", scout.signal_mode());

    let opportunities = scout.load_opportunities().await;
    let passive: Vec<&Opportunity> = opportunities.iter().filter(|o| o.is_passive()).collect();
    let alpha = alpha_feed(&opportunities, &args.token);

    let invest = match &args.invest {
        Some(id) => Some(scout.invest(&opportunities, id).await?),
        None => None,
    };

    let wallet = match wallet_address {
        Some(address) => Some(scout.wallet_state(Some(address)).await),
        None => None,
    };

    if args.json {
        let report = JsonReport {
            mode: scout.signal_mode().to_string(),
            passive,
            alpha,
            invest,
            wallet,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_section("Yield Scout (Passive)", &passive);
    print_section(&format!("Social Alpha (Active) - {}", args.token), &alpha);
    println!();
    println!("  {} {}", style("Filters:").dim(), filter_labels().join(" | "));

    if let Some(receipt) = &invest {
        print_invest(receipt);
    }
    if let Some(wallet) = &wallet {
        print_wallet(wallet);
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opportunity::default_catalog;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["alpha-scout"]).unwrap();
        assert_eq!(args.token, "ALL");
        assert!(!args.json && !args.verbose);
        assert!(args.invest.is_none() && args.wallet.is_none());
    }

    #[test]
    fn test_args_full() {
        let args = Args::try_parse_from([
            "alpha-scout",
            "--config",
            "scout.toml",
            "--token",
            "DEGEN",
            "--json",
            "--invest",
            "alpha-2",
            "--wallet",
            "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("scout.toml")));
        assert_eq!(args.token, "DEGEN");
        assert_eq!(args.invest.as_deref(), Some("alpha-2"));
        assert!(args.json && args.verbose);
    }

    #[test]
    fn test_filter_labels() {
        let labels = filter_labels();
        assert_eq!(labels[0], "ALL");
        assert_eq!(labels.len(), 11);
        assert!(labels.contains(&"DEGEN"));
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address(" 0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913 ").is_ok());
        assert!(parse_address("not-an-address").is_err());
    }

    #[test]
    fn test_describe() {
        let catalog = default_catalog();
        let aave = catalog.iter().find(|o| o.id == "passive-1").unwrap();
        assert_eq!(describe(aave), "👻 Aave V3 | USDC | APY 4.50% | TVL $50M");

        // Zero APY is "unknown", not shown
        let degen = catalog.iter().find(|o| o.id == "alpha-2").unwrap();
        assert!(!describe(degen).contains("APY"));
    }
}
