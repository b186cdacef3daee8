//! Rate governance for provider workers.
//!
//! # Data Flow
//! ```text
//! Worker receives an address
//!     → rate.rs admit / should_flush_now (batch cap, remaining hourly quota)
//!     → flush: consume(len) before the remote call
//!     → 429 from provider: on_rate_limited (window spent)
//!     → UTC hour boundary (clock.rs): on_window_boundary
//! ```
//!
//! # Design Decisions
//! - Pure state owned by one worker; no locking
//! - Time is passed in, so the policy is testable without sleeping

pub mod clock;
pub mod rate;

pub use clock::{Clock, MonotonicClock, SystemClock};
pub use rate::{next_window_boundary, RateGovernor};
