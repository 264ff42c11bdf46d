//! Time source for the pacing loop
//!
//! All waiting and timing in the controller goes through [`Clock`], so a run
//! can be driven against real time ([`TokioClock`]) or simulated time
//! ([`ManualClock`]).

use async_trait::async_trait;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Monotonic time, wall-clock time and sleeping
#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic instant used for every duration measurement
    fn now(&self) -> Instant;

    /// Local wall-clock time, used only for display
    fn local_time(&self) -> DateTime<Local>;

    /// Suspends the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real time backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn local_time(&self) -> DateTime<Local> {
        Local::now()
    }

    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Simulated time that only moves when told to.
///
/// `sleep` returns immediately after advancing the clock and recording the
/// requested duration, so a full run completes without real delays.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: DateTime<Local>,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            wall_origin: Local::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Moves time forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }

    /// Simulated time since construction
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }

    /// Every duration passed to [`Clock::sleep`], in call order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn local_time(&self) -> DateTime<Local> {
        let offset = chrono::Duration::from_std(self.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.wall_origin + offset
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_on_demand() {
        let clock = ManualClock::new();
        let start = clock.now();
        let wall_start = clock.local_time();

        clock.advance(Duration::from_secs(3));
        tokio_test::block_on(clock.sleep(Duration::from_secs(7)));

        assert_eq!(clock.now() - start, Duration::from_secs(10));
        assert_eq!(clock.elapsed(), Duration::from_secs(10));
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(7)]);
        assert_eq!((clock.local_time() - wall_start).num_seconds(), 10);
    }

    #[tokio::test]
    async fn tokio_clock_skips_zero_sleep() {
        let clock = TokioClock;
        let before = clock.now();
        clock.sleep(Duration::ZERO).await;
        assert!(clock.now() >= before);
    }
}
