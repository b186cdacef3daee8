//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the pool.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HammerConfig {
    /// Queue sizes and batching cadence.
    pub pool: PoolConfig,

    /// Re-queue policy for failed batches.
    pub retry: RetryConfig,

    /// Per-provider settings.
    pub providers: ProvidersConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Capacity of the shared input queue.
    pub queue_capacity: usize,

    /// Capacity of the shared output stream.
    pub output_capacity: usize,

    /// How long a worker collects addresses before flushing a partial batch.
    pub collection_timeout_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            output_capacity: 256,
            collection_timeout_ms: 5_000,
        }
    }
}

/// Retry configuration for addresses from failed batches.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts per address; 0 retries forever.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

/// Settings for every known provider.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    pub blockcypher: BlockcypherConfig,
    pub blockonomics: BlockonomicsConfig,
}

/// api.blockcypher.com settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockcypherConfig {
    pub enabled: bool,

    /// API root, e.g. "https://api.blockcypher.com/v1/btc/main".
    pub base_url: String,

    /// Addresses per request.
    pub batch_limit: usize,

    /// Addresses per UTC hour.
    pub hourly_limit: Option<u32>,

    /// Pause after every flush in milliseconds (0 disables).
    pub pace_ms: u64,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BlockcypherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.blockcypher.com/v1/btc/main".to_string(),
            batch_limit: 3,
            hourly_limit: Some(200),
            // Documented 3 req/s is not enough in practice
            pace_ms: 1_000,
            timeout_secs: 30,
        }
    }
}

/// www.blockonomics.co settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockonomicsConfig {
    pub enabled: bool,

    /// Balance endpoint.
    pub url: String,

    /// Addresses per request.
    pub batch_limit: usize,

    /// Addresses per UTC hour (unlimited when absent).
    pub hourly_limit: Option<u32>,

    /// Pause after every flush in milliseconds (0 disables).
    pub pace_ms: u64,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BlockonomicsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://www.blockonomics.co/api/balance".to_string(),
            batch_limit: 25,
            hourly_limit: None,
            pace_ms: 0,
            timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
