//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build provider adapters → Start worker pool
//!
//! Shutdown (shutdown.rs):
//!     Trigger → broadcast to every worker → workers leave their loops
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then adapters, then workers
//! - Cooperative shutdown: in-flight provider calls finish, pending batches are dropped

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
