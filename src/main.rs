//! balance-hammer
//!
//! Looks up balances for a list of addresses across every enabled provider
//! and prints one JSON line per balance.
//!
//! # Architecture Overview
//!
//! ```text
//!   addresses (args / file)
//!        │
//!        ▼
//!   ┌──────────────┐     ┌───────────────────────────────────────────┐
//!   │  submission  │────▶│            shared input queue              │◀──┐
//!   └──────────────┘     └───────────────────────────────────────────┘   │
//!                              │                      │                   │ re-queue
//!                              ▼                      ▼                   │ (backoff)
//!                     ┌────────────────┐     ┌────────────────┐          │
//!                     │ worker         │     │ worker         │──────────┘
//!                     │ blockonomics   │     │ blockcypher    │
//!                     │ batch+governor │     │ batch+governor │
//!                     └───────┬────────┘     └───────┬────────┘
//!                             ▼                      ▼
//!                     ┌───────────────────────────────────────────┐
//!                     │            shared output stream            │──▶ stdout (JSON lines)
//!                     └───────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use balance_hammer::balance::Address;
use balance_hammer::config::{load_config, HammerConfig};
use balance_hammer::lifecycle::{signals, startup};
use balance_hammer::observability::{logging, metrics};
use balance_hammer::pool::spawn_submission;
use balance_hammer::{HammerError, HammerResult};

/// One quota window plus a minute of slack.
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 3_660;

#[derive(Parser)]
#[command(name = "balance-hammer")]
#[command(about = "Query address balances across rate-limited providers", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File with one address per line; `#` starts a comment
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Stop after this many seconds without a new result. The default
    /// outlasts one hourly quota window, during which a throttled provider
    /// legitimately produces nothing.
    #[arg(long, default_value_t = DEFAULT_IDLE_TIMEOUT_SECS)]
    idle_timeout_secs: u64,

    /// Also print addresses with a zero total balance
    #[arg(long)]
    include_empty: bool,

    /// Addresses to look up
    addresses: Vec<String>,
}

fn read_address_file(path: &Path) -> HammerResult<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_address_lines(&content))
}

/// Positional addresses followed by the ones from `--file`.
fn collect_addresses(cli: &Cli) -> HammerResult<Vec<String>> {
    let mut addresses = cli.addresses.clone();
    if let Some(path) = &cli.file {
        addresses.extend(read_address_file(path)?);
    }
    if addresses.is_empty() {
        return Err(HammerError::NoAddresses);
    }
    Ok(addresses)
}

fn parse_address_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HammerConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("balance-hammer v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let addresses = collect_addresses(&cli)?;

    let mut pending: HashSet<Address> = addresses.iter().map(|a| Address::from(a.as_str())).collect();
    tracing::info!(addresses = pending.len(), "Submitting addresses");

    let (pool, mut results) = startup::start_from_config(&config)?;
    let submission = spawn_submission(addresses.into_iter().map(Address::from).collect(), pool.input());

    let idle = Duration::from_secs(cli.idle_timeout_secs);
    loop {
        tokio::select! {
            _ = signals::wait_for_signal() => break,
            next = tokio::time::timeout(idle, results.recv()) => match next {
                Ok(Some(result)) => {
                    pending.remove(&result.address);
                    if cli.include_empty || !result.total.is_zero() {
                        println!("{}", serde_json::to_string(&result)?);
                    }
                    if pending.is_empty() {
                        tracing::info!("Every address answered");
                        break;
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(unanswered = pending.len(), "No results for {}s, giving up", idle.as_secs());
                    break;
                }
            }
        }
    }

    submission.abort();
    pool.stop();
    pool.join().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
