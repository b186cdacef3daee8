//! Provider failure taxonomy.

use thiserror::Error;

/// Errors a provider adapter can signal for one remote call.
///
/// None of these are fatal: the worker re-queues the whole batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Transport failure, timeout or a non-2xx status other than 429.
    #[error("{provider} unreachable: {message}")]
    Unreachable { provider: String, message: String },

    /// The remote side explicitly throttled us (HTTP 429).
    #[error("rate limited by {provider}")]
    RateLimited { provider: String },

    /// The payload could not be decoded into balances.
    #[error("invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },
}

impl ProviderError {
    pub fn unreachable(provider: &str, message: impl Into<String>) -> Self {
        Self::Unreachable {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn rate_limited(provider: &str) -> Self {
        Self::RateLimited {
            provider: provider.to_string(),
        }
    }

    pub fn invalid_response(provider: &str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "unreachable",
            Self::RateLimited { .. } => "rate_limited",
            Self::InvalidResponse { .. } => "invalid_response",
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}
