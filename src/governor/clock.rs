//! Wall-clock sources for quota windows.

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;

/// Source of the current UTC time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall time derived from the tokio monotonic clock.
///
/// Anchored at a fixed UTC instant and advanced by `tokio::time::Instant`,
/// so it follows paused or manually advanced tokio time.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    wall_origin: DateTime<Utc>,
    origin: Instant,
}

impl MonotonicClock {
    pub fn starting_at(wall_origin: DateTime<Utc>) -> Self {
        Self {
            wall_origin,
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.origin.elapsed()).unwrap_or(TimeDelta::MAX);
        self.wall_origin
            .checked_add_signed(elapsed)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_monotonic_clock_follows_tokio_time() {
        let origin = DateTime::parse_from_rfc3339("2024-03-01T10:59:00Z").unwrap().with_timezone(&Utc);
        let clock = MonotonicClock::starting_at(origin);
        assert_eq!(clock.now(), origin);

        tokio::time::advance(Duration::from_secs(90)).await;
        assert_eq!(clock.now(), origin + TimeDelta::seconds(90));
    }
}
