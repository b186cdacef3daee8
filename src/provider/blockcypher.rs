//! Blockcypher balance adapter.
//!
//! `GET {base_url}/addrs/{a;b;c}/balance`
//!
//! Several addresses come back as a JSON array; a single address comes back
//! as a bare object. Unknown addresses show up as `{"error": "..."}` entries.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::balance::{Address, Amount, BalanceRecord};
use crate::config::BlockcypherConfig;
use crate::provider::error::ProviderError;
use crate::provider::http;
use crate::provider::ProviderAdapter;

#[derive(Debug, Deserialize)]
struct BlockcypherBalance {
    address: String,
    balance: i64,
    unconfirmed_balance: i64,
    final_balance: i64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BlockcypherEntry {
    Balance(BlockcypherBalance),
    Error { error: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BlockcypherResponse {
    Many(Vec<BlockcypherEntry>),
    One(BlockcypherEntry),
}

/// Adapter for api.blockcypher.com.
pub struct Blockcypher {
    client: reqwest::Client,
    config: BlockcypherConfig,
}

impl Blockcypher {
    pub const NAME: &'static str = "blockcypher";

    pub fn new(config: BlockcypherConfig) -> Result<Self, ProviderError> {
        let client = http::build_client(Self::NAME, Duration::from_secs(config.timeout_secs))?;
        Ok(Self { client, config })
    }

    fn balance_url(&self, addresses: &[Address]) -> String {
        let joined = addresses
            .iter()
            .map(Address::as_str)
            .collect::<Vec<_>>()
            .join(";");
        format!("{}/addrs/{}/balance", self.config.base_url.trim_end_matches('/'), joined)
    }
}

/// Decode a balance response body into records, dropping error entries.
fn parse_balances(body: &[u8]) -> Result<Vec<BalanceRecord>, serde_json::Error> {
    let entries = match serde_json::from_slice::<BlockcypherResponse>(body)? {
        BlockcypherResponse::Many(entries) => entries,
        BlockcypherResponse::One(entry) => vec![entry],
    };

    let records = entries
        .into_iter()
        .filter_map(|entry| match entry {
            BlockcypherEntry::Balance(b) => Some(BalanceRecord {
                address: Address::from(b.address),
                confirmed: Amount::from_sat(b.balance),
                unconfirmed: Amount::from_sat(b.unconfirmed_balance),
                total: Some(Amount::from_sat(b.final_balance)),
            }),
            BlockcypherEntry::Error { error } => {
                tracing::warn!(provider = Blockcypher::NAME, error = %error, "Skipping unrecognized address");
                None
            }
        })
        .collect();

    Ok(records)
}

#[async_trait]
impl ProviderAdapter for Blockcypher {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn batch_limit(&self) -> usize {
        self.config.batch_limit
    }

    fn hourly_quota(&self) -> Option<u32> {
        self.config.hourly_limit
    }

    fn pace(&self) -> Option<Duration> {
        (self.config.pace_ms > 0).then(|| Duration::from_millis(self.config.pace_ms))
    }

    async fn fetch_balances(&self, addresses: &[Address]) -> Result<Vec<BalanceRecord>, ProviderError> {
        let url = self.balance_url(addresses);
        tracing::debug!(provider = Self::NAME, count = addresses.len(), "Querying balances");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| http::send_error(Self::NAME, e))?;
        let response = http::check_status(Self::NAME, response)?;
        let body = response.bytes().await.map_err(|e| http::send_error(Self::NAME, e))?;

        parse_balances(&body).map_err(|e| ProviderError::invalid_response(Self::NAME, e.to_string()))
    }
}
