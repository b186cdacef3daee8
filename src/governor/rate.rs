//! Per-provider batch and hourly quota policy.
//!
//! # Invariants
//! - `0 <= used <= limit`
//! - No flush is started while `used == limit`; the window must reset first
//! - Windows are aligned to UTC calendar hours, not to first use
//!
//! Quota is spent when a flush starts. A failed call is not refunded, so
//! fast retries of a failing batch cannot get around the provider's limiter.

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

use crate::provider::ProviderAdapter;

const WINDOW_SECS: i64 = 3_600;

/// Start of the UTC hour following `now`.
pub fn next_window_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    let next = (now.timestamp().div_euclid(WINDOW_SECS) + 1) * WINDOW_SECS;
    DateTime::from_timestamp(next, 0).unwrap_or(now + TimeDelta::seconds(WINDOW_SECS))
}

#[derive(Debug, Clone)]
struct HourlyQuota {
    limit: u32,
    used: u32,
    reset_at: DateTime<Utc>,
}

/// Decides when a worker may flush and when it must wait.
#[derive(Debug, Clone)]
pub struct RateGovernor {
    batch_limit: usize,
    quota: Option<HourlyQuota>,
}

impl RateGovernor {
    pub fn new(batch_limit: usize, hourly_quota: Option<u32>, now: DateTime<Utc>) -> Self {
        Self {
            batch_limit: batch_limit.max(1),
            quota: hourly_quota.map(|limit| HourlyQuota {
                limit,
                used: 0,
                reset_at: next_window_boundary(now),
            }),
        }
    }

    pub fn for_adapter(adapter: &dyn ProviderAdapter, now: DateTime<Utc>) -> Self {
        Self::new(adapter.batch_limit(), adapter.hourly_quota(), now)
    }

    pub fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    pub fn quota_limit(&self) -> Option<u32> {
        self.quota.as_ref().map(|q| q.limit)
    }

    pub fn used(&self) -> u32 {
        self.quota.as_ref().map_or(0, |q| q.used)
    }

    /// Addresses left in the current window, `None` when unlimited.
    pub fn remaining(&self) -> Option<u32> {
        self.quota.as_ref().map(|q| q.limit - q.used)
    }

    pub fn window_reset_at(&self) -> Option<DateTime<Utc>> {
        self.quota.as_ref().map(|q| q.reset_at)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == Some(0)
    }

    /// Whether a batch of `n` addresses respects both the batch and the quota limits.
    pub fn admit(&self, n: usize) -> bool {
        n <= self.batch_limit && self.remaining().map_or(true, |r| n <= r as usize)
    }

    /// True when the batch is full, or exactly uses up what is left of the quota.
    pub fn should_flush_now(&self, batch_size: usize) -> bool {
        batch_size == self.batch_limit || self.remaining().is_some_and(|r| batch_size == r as usize)
    }

    /// Spend quota for `n` addresses about to be sent.
    pub fn consume(&mut self, n: usize) {
        if let Some(q) = self.quota.as_mut() {
            let n = u32::try_from(n).unwrap_or(u32::MAX);
            q.used = q.used.saturating_add(n).min(q.limit);
        }
    }

    /// Reset usage and move the boundary to the next UTC hour after `now`.
    pub fn on_window_boundary(&mut self, now: DateTime<Utc>) {
        if let Some(q) = self.quota.as_mut() {
            q.used = 0;
            q.reset_at = next_window_boundary(now);
        }
    }

    /// Run the boundary reset if `now` is at or past it. Returns whether it ran.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> bool {
        match self.window_reset_at() {
            Some(reset_at) if now >= reset_at => {
                self.on_window_boundary(now);
                true
            }
            _ => false,
        }
    }

    /// The remote side throttled us: treat the window as spent.
    pub fn on_rate_limited(&mut self) {
        if let Some(q) = self.quota.as_mut() {
            q.used = q.limit;
        }
    }

    /// Time left until the boundary, `None` when there is no quota.
    pub fn until_reset(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.window_reset_at()
            .map(|reset_at| (reset_at - now).to_std().unwrap_or(Duration::ZERO))
    }
}
