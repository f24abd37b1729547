//! Fixed-interval tick scheduling
//!
//! Drives the controller on a wall-clock interval. Ticks never overlap: a
//! tick that runs longer than the interval defers the next one until it has
//! completed, it is never run concurrently and never dropped. There is no
//! jitter or backoff.

use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Drives one `run_tick` invocation per configured interval
pub struct TickScheduler {
    interval: Interval,
    period: Duration,
}

impl TickScheduler {
    /// Create a scheduler. The first tick fires one full period after
    /// creation; bootstrap has already applied initial settings by then.
    pub fn new(period: Duration) -> Self {
        let period = period.max(Duration::from_secs(1));
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, period }
    }

    /// Configured tick period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick boundary
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_full_period() {
        let mut scheduler = TickScheduler::new(Duration::from_secs(300));
        let started = Instant::now();
        scheduler.tick().await;
        assert!(started.elapsed() >= Duration::from_secs(300));
    }

    #[tokio::test(start_paused = true)]
    async fn overrunning_tick_defers_instead_of_bursting() {
        let mut scheduler = TickScheduler::new(Duration::from_secs(10));
        scheduler.tick().await;

        // Simulate a tick body that overruns the interval by 25 seconds
        tokio::time::advance(Duration::from_secs(25)).await;

        let before = Instant::now();
        scheduler.tick().await;
        let first_gap = before.elapsed();

        let before = Instant::now();
        scheduler.tick().await;
        let second_gap = before.elapsed();

        // The missed tick fires immediately, then cadence resumes at the
        // full period rather than bursting to catch up
        assert!(first_gap < Duration::from_secs(1));
        assert!(second_gap >= Duration::from_secs(10));
    }

    #[tokio::test]
    async fn sub_second_periods_are_clamped() {
        let scheduler = TickScheduler::new(Duration::from_millis(10));
        assert_eq!(scheduler.period(), Duration::from_secs(1));
    }
}
