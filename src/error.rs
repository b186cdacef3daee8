//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::provider::ProviderError;

/// Errors surfaced to whoever drives the pool.
#[derive(Debug, Error)]
pub enum HammerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("provider setup failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no addresses given")]
    NoAddresses,
}

pub type HammerResult<T> = Result<T, HammerError>;
