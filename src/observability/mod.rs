//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Workers, adapters and the retry policy produce:
//!     → logging.rs (structured tracing events, flush spans with batch IDs)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stderr
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```

pub mod logging;
pub mod metrics;
