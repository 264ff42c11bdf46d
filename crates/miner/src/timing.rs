use std::time::Duration;

/// Mine durations split at a block height threshold.
///
/// A cycle targeting height `h` lands in the first bucket when
/// `h <= threshold` and in the second otherwise, so the buckets are disjoint
/// and together hold every recorded cycle in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingBuckets {
    threshold: u64,
    up_to_threshold: Vec<Duration>,
    after_threshold: Vec<Duration>,
}

impl TimingBuckets {
    pub fn new(threshold: u64) -> Self {
        Self {
            threshold,
            up_to_threshold: Vec::new(),
            after_threshold: Vec::new(),
        }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Records the mine duration of the cycle targeting `block_index`
    pub fn record(&mut self, block_index: u64, mine_duration: Duration) {
        if block_index <= self.threshold {
            self.up_to_threshold.push(mine_duration);
        } else {
            self.after_threshold.push(mine_duration);
        }
    }

    pub fn up_to_threshold(&self) -> &[Duration] {
        &self.up_to_threshold
    }

    pub fn after_threshold(&self) -> &[Duration] {
        &self.after_threshold
    }

    /// Number of recorded cycles across both buckets
    pub fn len(&self) -> usize {
        self.up_to_threshold.len() + self.after_threshold.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mean_up_to_threshold(&self) -> Option<Duration> {
        mean(&self.up_to_threshold)
    }

    pub fn mean_after_threshold(&self) -> Option<Duration> {
        mean(&self.after_threshold)
    }

    /// Mean over both buckets
    pub fn mean_overall(&self) -> Option<Duration> {
        if self.is_empty() {
            return None;
        }
        let total: Duration = self
            .up_to_threshold
            .iter()
            .chain(self.after_threshold.iter())
            .sum();
        Some(Duration::from_secs_f64(
            total.as_secs_f64() / self.len() as f64,
        ))
    }
}

fn mean(samples: &[Duration]) -> Option<Duration> {
    if samples.is_empty() {
        return None;
    }
    let total: Duration = samples.iter().sum();
    Some(Duration::from_secs_f64(
        total.as_secs_f64() / samples.len() as f64,
    ))
}

/// Aggregate statistics of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Chain height before the first cycle
    pub start_height: u64,
    /// Chain height queried after the last cycle
    pub final_height: u64,
    /// Cycles attempted, skipped ones included
    pub cycles: u64,
    /// Cycles whose block production exhausted its retries
    pub skipped: u64,
    /// Wall-clock time from the first cycle to the end of the last
    pub total_elapsed: Duration,
    /// Mine durations of the successful cycles
    pub buckets: TimingBuckets,
}

impl RunSummary {
    /// Total time divided by every attempted cycle
    pub fn average_cycle_time(&self) -> Duration {
        if self.cycles == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.total_elapsed.as_secs_f64() / self.cycles as f64)
    }

    /// Mean mine duration over the successful cycles
    pub fn mean_mine_duration(&self) -> Option<Duration> {
        self.buckets.mean_overall()
    }

    pub fn produced(&self) -> u64 {
        self.cycles - self.skipped
    }
}
