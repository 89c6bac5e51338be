//! Renderer notifications and run reports.

use crate::engine::algorithm::Algorithm;
use crate::engine::step::{SortedRange, TerminalMarks};
use crate::errors::VisualizerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which visualiser a lane drives: 1 alone, 1 and 2 in a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    pub fn index(self) -> usize {
        match self {
            Slot::One => 0,
            Slot::Two => 1,
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }
}

impl TryFrom<u8> for Slot {
    type Error = VisualizerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Slot::One),
            2 => Ok(Slot::Two),
            slot => Err(VisualizerError::InvalidSlot { slot }),
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Events emitted to the renderer while sequences are generated and sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SortEvent {
    /// A new sequence (and snapshot) was generated.
    Generated { slot: Slot, values: Vec<u32> },
    /// The sequence was restored to its snapshot; highlights should be cleared.
    Reset { slot: Slot, values: Vec<u32> },
    /// A run began.
    RunStarted {
        slot: Slot,
        algorithm: Algorithm,
        len: usize,
    },
    /// Two positions are being compared.
    CompareStarted { slot: Slot, indices: [usize; 2] },
    /// The comparison (and any swap it caused) is over.
    CompareEnded { slot: Slot, indices: [usize; 2] },
    /// Two positions exchanged values; `values` are the new values at `indices`.
    Swapped {
        slot: Slot,
        indices: [usize; 2],
        values: [u32; 2],
    },
    /// One position was overwritten by a merge.
    Placed { slot: Slot, index: usize, value: u32 },
    /// A range became final.
    RangeSorted { slot: Slot, range: SortedRange },
    /// Counter values after a change.
    CountersChanged {
        slot: Slot,
        comparisons: u64,
        swaps: u64,
    },
    /// Elapsed time for display.
    TimeChanged { slot: Slot, elapsed_ms: u64 },
    /// The run finished.
    RunFinished { slot: Slot, report: Box<RunReport> },
}

impl SortEvent {
    pub fn slot(&self) -> Slot {
        match self {
            SortEvent::Generated { slot, .. }
            | SortEvent::Reset { slot, .. }
            | SortEvent::RunStarted { slot, .. }
            | SortEvent::CompareStarted { slot, .. }
            | SortEvent::CompareEnded { slot, .. }
            | SortEvent::Swapped { slot, .. }
            | SortEvent::Placed { slot, .. }
            | SortEvent::RangeSorted { slot, .. }
            | SortEvent::CountersChanged { slot, .. }
            | SortEvent::TimeChanged { slot, .. }
            | SortEvent::RunFinished { slot, .. } => *slot,
        }
    }
}

/// Outcome of one finished lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub slot: Slot,
    pub algorithm: Algorithm,
    /// Final values (sorted once the run finished)
    pub values: Vec<u32>,
    pub comparisons: u64,
    pub swaps: u64,
    /// Wall-clock duration of the run in milliseconds
    #[serde(rename = "elapsed_ms", with = "duration_serde")]
    pub elapsed: Duration,
    /// Sorted ranges in the order they became final
    pub marks: TerminalMarks,
}

impl RunReport {
    /// Total visible work: comparisons plus swaps.
    pub fn steps(&self) -> u64 {
        self.comparisons + self.swaps
    }

    /// Whether the final values are in non-decreasing order.
    pub fn is_sorted(&self) -> bool {
        self.values.windows(2).all(|w| w[0] <= w[1])
    }
}

/// Serde helpers for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
