//! Address balance lookups spread over rate-limited providers.
//!
//! A pool of provider workers pulls addresses from one shared queue, batches
//! them within each provider's limits, calls the provider and publishes
//! normalized balances on one shared output stream.

pub mod balance;
pub mod config;
pub mod error;
pub mod governor;
pub mod lifecycle;
pub mod observability;
pub mod pool;
pub mod provider;
pub mod resilience;
pub mod worker;

pub use balance::{Address, Amount, BalanceResult};
pub use config::HammerConfig;
pub use error::{HammerError, HammerResult};
pub use lifecycle::Shutdown;
pub use pool::{submit_addresses, Pool, PoolSettings};
pub use provider::{ProviderAdapter, ProviderError};
