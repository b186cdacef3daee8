//! Startup orchestration.
//!
//! Config → provider adapters → pool. Any adapter construction error is
//! fatal; the pool only starts once every enabled provider is ready.

use tokio::sync::mpsc;

use crate::balance::BalanceResult;
use crate::config::HammerConfig;
use crate::error::HammerResult;
use crate::pool::{Pool, PoolSettings};
use crate::provider::build_adapters;

/// Build every enabled provider from `config` and start the pool.
pub fn start_from_config(config: &HammerConfig) -> HammerResult<(Pool, mpsc::Receiver<BalanceResult>)> {
    let adapters = build_adapters(&config.providers)?;
    let settings = PoolSettings::from_config(config);
    Ok(Pool::start(adapters, settings))
}
