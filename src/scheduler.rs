//! Step pacing.
//!
//! Every visible algorithm step passes through [`StepScheduler::suspend`]. The
//! delay is read when the suspension starts, so a speed change lands on the
//! next step and never stretches or shortens one already in progress.

use crate::errors::VisualizerError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lower bound applied to every delay set through the public setters.
pub const MIN_STEP_DELAY: Duration = Duration::from_millis(1);

/// Discrete speed presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayPreset {
    Slow,
    #[default]
    Normal,
    Fast,
    Instant,
}

impl DelayPreset {
    pub fn delay(self) -> Duration {
        match self {
            DelayPreset::Slow => Duration::from_millis(500),
            DelayPreset::Normal => Duration::from_millis(100),
            DelayPreset::Fast => Duration::from_millis(20),
            DelayPreset::Instant => MIN_STEP_DELAY,
        }
    }
}

impl std::fmt::Display for DelayPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DelayPreset::Slow => write!(f, "slow"),
            DelayPreset::Normal => write!(f, "normal"),
            DelayPreset::Fast => write!(f, "fast"),
            DelayPreset::Instant => write!(f, "instant"),
        }
    }
}

impl std::str::FromStr for DelayPreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slow" => Ok(DelayPreset::Slow),
            "normal" => Ok(DelayPreset::Normal),
            "fast" => Ok(DelayPreset::Fast),
            "instant" => Ok(DelayPreset::Instant),
            _ => anyhow::bail!(
                "Invalid speed preset '{}'. Valid values: slow, normal, fast, instant",
                s
            ),
        }
    }
}

/// Maps a linear control value onto an exponential delay curve.
///
/// `delay = max * (min / max) ^ (value / control_max)`: value 0 is the slowest
/// setting, `control_max` the fastest, and equal control steps feel like
/// equal changes in speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedControl {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub control_max: u32,
}

impl Default for SpeedControl {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(1000),
            control_max: 100,
        }
    }
}

impl SpeedControl {
    pub fn new(min_delay: Duration, max_delay: Duration, control_max: u32) -> Self {
        Self {
            min_delay: min_delay.max(MIN_STEP_DELAY),
            max_delay: max_delay.max(min_delay).max(MIN_STEP_DELAY),
            control_max: control_max.max(1),
        }
    }

    /// Delay for a control value; errors when the value is out of range.
    pub fn delay_for(&self, value: u32) -> Result<Duration, VisualizerError> {
        if value > self.control_max {
            return Err(VisualizerError::InvalidDelay {
                value,
                max: self.control_max,
            });
        }
        let min = self.min_delay.as_secs_f64();
        let max = self.max_delay.as_secs_f64();
        let exponent = value as f64 / self.control_max as f64;
        let secs = max * (min / max).powf(exponent);
        Ok(Duration::from_secs_f64(secs).max(MIN_STEP_DELAY))
    }

    /// Control value whose mapped delay is closest to `delay`, for seeding a slider.
    pub fn value_for(&self, delay: Duration) -> u32 {
        let min = self.min_delay.as_secs_f64();
        let max = self.max_delay.as_secs_f64();
        if min >= max {
            return self.control_max;
        }
        let d = delay.as_secs_f64().clamp(min, max);
        let ratio = (d / max).ln() / (min / max).ln();
        (ratio * self.control_max as f64).round() as u32
    }

    /// Step size used by keyboard speed control (10% of the range, at least 1).
    pub fn nudge(&self) -> u32 {
        (self.control_max / 10).max(1)
    }
}

/// Shared pacing primitive.
///
/// Cheap to clone; clones share the delay, so a controller can hold one copy
/// and retune the speed while engines suspend on theirs.
#[derive(Debug, Clone)]
pub struct StepScheduler {
    delay_micros: Arc<AtomicU64>,
    suspensions: Arc<AtomicU64>,
}

impl StepScheduler {
    /// Create a scheduler with the given delay (clamped to [`MIN_STEP_DELAY`]).
    pub fn new(delay: Duration) -> Self {
        let scheduler = Self {
            delay_micros: Arc::new(AtomicU64::new(0)),
            suspensions: Arc::new(AtomicU64::new(0)),
        };
        scheduler.set_delay(delay);
        scheduler
    }

    /// Zero-delay scheduler for tests: each suspension still yields to the runtime.
    pub fn immediate() -> Self {
        Self {
            delay_micros: Arc::new(AtomicU64::new(0)),
            suspensions: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Replace the delay used by the next suspension.
    pub fn set_delay(&self, delay: Duration) {
        let delay = delay.max(MIN_STEP_DELAY);
        self.delay_micros
            .store(delay.as_micros() as u64, Ordering::SeqCst);
    }

    pub fn set_preset(&self, preset: DelayPreset) {
        self.set_delay(preset.delay());
    }

    /// Apply a control value through the exponential mapping.
    pub fn set_control_value(
        &self,
        control: &SpeedControl,
        value: u32,
    ) -> Result<Duration, VisualizerError> {
        let delay = control.delay_for(value)?;
        self.set_delay(delay);
        Ok(delay)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_micros(self.delay_micros.load(Ordering::SeqCst))
    }

    /// Number of suspensions started so far across every clone.
    pub fn suspensions(&self) -> u64 {
        self.suspensions.load(Ordering::SeqCst)
    }

    /// Suspend the caller for the current delay.
    ///
    /// The delay is captured when this is called, not when the returned future
    /// is first polled. The future resolves to the delay it waited.
    pub fn suspend(&self) -> impl Future<Output = Duration> + Send + 'static {
        let delay = self.delay();
        self.suspensions.fetch_add(1, Ordering::SeqCst);
        async move {
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
            delay
        }
    }
}
