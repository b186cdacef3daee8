//! Provider workers.
//!
//! # Data Flow
//! ```text
//! shared input queue (queue.rs, any idle worker dequeues)
//!     → batch.rs (collect up to batch_limit / remaining quota)
//!     → event_loop.rs flush → ProviderAdapter
//!     → success: BalanceResult per record → shared output stream
//!     → failure: resilience::RetryPolicy re-queues the whole batch
//! ```
//!
//! # Design Decisions
//! - One worker per provider; batch and governor are private to it (no locks)
//! - Cooperative cancellation: stop is observed between iterations, an
//!   in-flight provider call is allowed to finish
//! - Publishing blocks on a slow consumer, stalling only that worker

pub mod batch;
pub mod event_loop;
pub mod queue;

pub use batch::Batch;
pub use event_loop::{Worker, WorkerHandle, WorkerSettings};
pub use queue::{AddressQueue, AddressSender, QueueClosed, QueueConsumer, QueuedAddress};
