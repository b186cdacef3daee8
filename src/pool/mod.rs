//! Worker pool.
//!
//! # Data Flow
//! ```text
//! caller → submit.rs → shared input queue
//!     → scheduler.rs: one Worker per provider, all on the same queue,
//!       output stream and stop signal
//!     → shared output stream → caller
//! Pool::stop → broadcast → every worker leaves its loop
//! ```
//!
//! # Design Decisions
//! - No provider affinity: whichever worker is idle takes the next address
//! - Stop is a broadcast, not a consumed message; each worker sees it once

pub mod scheduler;
pub mod submit;

pub use scheduler::{Pool, PoolSettings};
pub use submit::{spawn_submission, submit_addresses};
