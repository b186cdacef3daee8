//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HammerConfig (validated, immutable)
//!     → provider adapters and pool settings built from it
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BlockcypherConfig, BlockonomicsConfig, HammerConfig, ObservabilityConfig, PoolConfig, ProvidersConfig,
    RetryConfig,
};
pub use validation::ValidationError;
