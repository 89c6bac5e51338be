//! Comparison, swap and elapsed-time instrumentation for one lane.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Interval at which live elapsed-time notifications are emitted while running.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Counters for a single sort run.
///
/// Elapsed time is computed from a monotonic clock as `stop - start`, never by
/// summing ticks, so display ticks cannot drift the final value.
#[derive(Debug, Clone, Default)]
pub struct InstrumentationCounters {
    comparisons: u64,
    swaps: u64,
    started_at: Option<Instant>,
    frozen: Option<Duration>,
    last_tick: Option<Instant>,
}

impl InstrumentationCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one comparison and return the new total.
    pub fn record_comparison(&mut self) -> u64 {
        self.comparisons += 1;
        self.comparisons
    }

    /// Count one swap and return the new total.
    pub fn record_swap(&mut self) -> u64 {
        self.swaps += 1;
        self.swaps
    }

    pub fn comparisons(&self) -> u64 {
        self.comparisons
    }

    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    /// Start the clock. Restarting an already started clock is ignored.
    pub fn start_clock(&mut self) {
        if self.started_at.is_none() {
            let now = Instant::now();
            self.started_at = Some(now);
            self.last_tick = Some(now);
            self.frozen = None;
        }
    }

    /// Stop the clock and freeze the elapsed value.
    pub fn stop_clock(&mut self) -> Duration {
        if let Some(frozen) = self.frozen {
            return frozen;
        }
        let elapsed = self
            .started_at
            .map(|start| start.elapsed())
            .unwrap_or_default();
        self.frozen = Some(elapsed);
        elapsed
    }

    /// Elapsed time: live while running, fixed once stopped, zero before start.
    pub fn elapsed(&self) -> Duration {
        match (self.frozen, self.started_at) {
            (Some(frozen), _) => frozen,
            (None, Some(start)) => start.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }

    /// Whether the clock is running.
    pub fn is_timing(&self) -> bool {
        self.started_at.is_some() && self.frozen.is_none()
    }

    /// Returns the live elapsed time if a display tick is due, advancing the tick mark.
    pub fn tick_due(&mut self) -> Option<Duration> {
        if !self.is_timing() {
            return None;
        }
        let now = Instant::now();
        let last = self.last_tick.unwrap_or(now);
        if now.duration_since(last) >= TICK_INTERVAL {
            self.last_tick = Some(now);
            Some(self.elapsed())
        } else {
            None
        }
    }

    /// Zero everything and forget the clock.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let mut counters = InstrumentationCounters::new();
        assert_eq!(counters.record_comparison(), 1);
        assert_eq!(counters.record_comparison(), 2);
        assert_eq!(counters.record_swap(), 1);
        assert_eq!(counters.comparisons(), 2);
        assert_eq!(counters.swaps(), 1);
    }

    #[test]
    fn test_elapsed_zero_before_start() {
        let counters = InstrumentationCounters::new();
        assert_eq!(counters.elapsed(), Duration::ZERO);
        assert!(!counters.is_timing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_frozen_at_stop() {
        let mut counters = InstrumentationCounters::new();
        counters.start_clock();
        tokio::time::advance(Duration::from_millis(250)).await;
        let stopped = counters.stop_clock();
        assert_eq!(stopped, Duration::from_millis(250));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(counters.elapsed(), Duration::from_millis(250));
        // Stopping again keeps the first value
        assert_eq!(counters.stop_clock(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_due_every_interval() {
        let mut counters = InstrumentationCounters::new();
        counters.start_clock();
        assert!(counters.tick_due().is_none());

        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(counters.tick_due().is_none());

        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(counters.tick_due(), Some(Duration::from_millis(110)));
        assert!(counters.tick_due().is_none());

        counters.stop_clock();
        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(counters.tick_due().is_none());
    }

    #[test]
    fn test_reset_zeroes_counters() {
        let mut counters = InstrumentationCounters::new();
        counters.record_comparison();
        counters.record_swap();
        counters.start_clock();
        counters.stop_clock();

        counters.reset();
        assert_eq!(counters.comparisons(), 0);
        assert_eq!(counters.swaps(), 0);
        assert_eq!(counters.elapsed(), Duration::ZERO);

        counters.reset();
        assert_eq!(counters.comparisons(), 0);
    }
}
