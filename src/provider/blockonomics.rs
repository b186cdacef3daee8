//! Blockonomics balance adapter.
//!
//! `POST {url}` with `{"addr": "a b c"}`, answered by
//! `{"response": [{"addr", "confirmed", "unconfirmed"}]}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::balance::{Address, Amount, BalanceRecord};
use crate::config::BlockonomicsConfig;
use crate::provider::error::ProviderError;
use crate::provider::http;
use crate::provider::ProviderAdapter;

#[derive(Debug, Serialize)]
struct BlockonomicsRequest {
    addr: String,
}

#[derive(Debug, Deserialize)]
struct BlockonomicsBalance {
    addr: String,
    confirmed: i64,
    unconfirmed: i64,
}

#[derive(Debug, Deserialize)]
struct BlockonomicsResponse {
    response: Vec<BlockonomicsBalance>,
}

impl From<BlockonomicsBalance> for BalanceRecord {
    fn from(b: BlockonomicsBalance) -> Self {
        BalanceRecord {
            address: Address::from(b.addr),
            confirmed: Amount::from_sat(b.confirmed),
            unconfirmed: Amount::from_sat(b.unconfirmed),
            // Not on the wire; derived when the result is built.
            total: None,
        }
    }
}

/// Adapter for www.blockonomics.co.
pub struct Blockonomics {
    client: reqwest::Client,
    config: BlockonomicsConfig,
}

impl Blockonomics {
    pub const NAME: &'static str = "blockonomics";

    pub fn new(config: BlockonomicsConfig) -> Result<Self, ProviderError> {
        let client = http::build_client(Self::NAME, Duration::from_secs(config.timeout_secs))?;
        Ok(Self { client, config })
    }
}

fn request_body(addresses: &[Address]) -> BlockonomicsRequest {
    BlockonomicsRequest {
        addr: addresses
            .iter()
            .map(Address::as_str)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[async_trait]
impl ProviderAdapter for Blockonomics {
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
        tracing::debug!(provider = Self::NAME, count = addresses.len(), "Querying balances");

        let response = self
            .client
            .post(&self.config.url)
            .json(&request_body(addresses))
            .send()
            .await
            .map_err(|e| http::send_error(Self::NAME, e))?;
        let response = http::check_status(Self::NAME, response)?;
        let decoded: BlockonomicsResponse = http::decode_json(Self::NAME, response).await?;

        Ok(decoded.response.into_iter().map(BalanceRecord::from).collect())
    }
}
