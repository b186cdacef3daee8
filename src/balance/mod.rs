//! Balance domain types.
//!
//! # Data Flow
//! ```text
//! Caller submits Address
//!     → provider adapter returns BalanceRecord (provider wire shape, normalized)
//!     → worker stamps the provider name → BalanceResult
//!     → shared output stream → caller
//! ```
//!
//! # Design Decisions
//! - Amounts are integers in the smallest currency unit (satoshi), never floats
//! - Addresses are opaque; nothing here validates them

pub mod types;

pub use types::{Address, Amount, BalanceRecord, BalanceResult};
