//! Remote balance-lookup providers.
//!
//! # Data Flow
//! ```text
//! Worker flush (1..=batch_limit addresses)
//!     → ProviderAdapter::fetch_balances (one outbound request)
//!     → http.rs (deadline, status classification, JSON decode)
//!     → Vec<BalanceRecord> | ProviderError
//! ```
//!
//! # Design Decisions
//! - One adapter type per provider behind a small trait; workers are generic over it
//! - Limits and URLs come from per-provider config structs, not constants
//! - Providers may omit unknown or empty addresses; no one-to-one mapping is assumed

pub mod blockcypher;
pub mod blockonomics;
pub mod error;
mod http;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::balance::{Address, BalanceRecord};
use crate::config::ProvidersConfig;

pub use blockcypher::Blockcypher;
pub use blockonomics::Blockonomics;
pub use error::ProviderError;

/// A remote balance-lookup service.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Provider name stamped on every result.
    fn name(&self) -> &str;

    /// Maximum addresses per remote call.
    fn batch_limit(&self) -> usize;

    /// Addresses allowed per UTC calendar hour, if the provider has such a quota.
    fn hourly_quota(&self) -> Option<u32> {
        None
    }

    /// Pause taken after every flush to stay under an undocumented throughput ceiling.
    fn pace(&self) -> Option<Duration> {
        None
    }

    /// Issue one remote request for `addresses` (at most `batch_limit`).
    async fn fetch_balances(&self, addresses: &[Address]) -> Result<Vec<BalanceRecord>, ProviderError>;
}

/// Build every enabled provider.
pub fn build_adapters(config: &ProvidersConfig) -> Result<Vec<Arc<dyn ProviderAdapter>>, ProviderError> {
    let mut adapters: Vec<Arc<dyn ProviderAdapter>> = Vec::new();

    if config.blockonomics.enabled {
        adapters.push(Arc::new(Blockonomics::new(config.blockonomics.clone())?));
    }
    if config.blockcypher.enabled {
        adapters.push(Arc::new(Blockcypher::new(config.blockcypher.clone())?));
    }

    tracing::info!(
        providers = ?adapters.iter().map(|a| a.name().to_string()).collect::<Vec<_>>(),
        "Provider adapters built"
    );
    Ok(adapters)
}
