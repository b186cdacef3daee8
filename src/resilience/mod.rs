//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Provider call fails (unreachable / rate limited / invalid response)
//!     → retries.rs (count attempt, give up past max_attempts)
//!     → backoff.rs (exponential delay with jitter)
//!     → detached task re-submits the addresses to the shared input queue
//! ```
//!
//! # Design Decisions
//! - Whole batch is re-queued; any worker of any provider may pick it up
//! - Retries are bounded by default; unlimited retry is opt-in

pub mod backoff;
pub mod retries;

pub use retries::RetryPolicy;
