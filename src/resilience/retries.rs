//! Re-queue policy for addresses from failed batches.
//!
//! # Responsibilities
//! - Count attempts per address
//! - Delay re-submission with exponential backoff
//! - Give up on an address after `max_attempts` (0 = never give up)
//!
//! Re-submission runs in a detached task: the input queue may be full and
//! read by the very worker that failed, so sending inline could deadlock.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::worker::queue::{AddressSender, QueuedAddress};

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }

    /// Retry forever with the given backoff.
    pub fn unlimited(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: 0,
            base_delay,
            max_delay,
        }
    }

    /// Whether an address that has failed `attempts` times may go back on the queue.
    pub fn allows(&self, attempts: u32) -> bool {
        self.max_attempts == 0 || attempts < self.max_attempts
    }

    pub fn delay_for(&self, attempts: u32) -> Duration {
        calculate_backoff(attempts, self.base_delay, self.max_delay)
    }

    /// Count one more failed attempt for every address, re-submit the ones
    /// still allowed in the background and return how many were re-queued.
    pub fn requeue(&self, provider: &str, failed: Vec<QueuedAddress>, input: &AddressSender) -> usize {
        let (retry, abandoned): (Vec<_>, Vec<_>) = failed
            .into_iter()
            .map(QueuedAddress::failed_once)
            .partition(|item| self.allows(item.attempts));

        for item in &abandoned {
            tracing::error!(
                provider = %provider,
                address = %item.address,
                attempts = item.attempts,
                "Giving up on address after repeated failures"
            );
        }
        metrics::record_abandoned(abandoned.len());

        if retry.is_empty() {
            return 0;
        }

        let count = retry.len();
        // Addresses of one batch share an attempt count in the common case
        let attempts = retry.iter().map(|item| item.attempts).max().unwrap_or(1);
        let delay = self.delay_for(attempts);
        let input = input.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            for item in retry {
                if input.send(item).await.is_err() {
                    tracing::warn!("Input queue closed, dropping re-queued addresses");
                    return;
                }
            }
        });

        metrics::record_requeued(count);
        count
    }
}
