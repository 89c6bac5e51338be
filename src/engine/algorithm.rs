//! The supported sort variants.

use crate::engine::step::StepCursor;
use crate::errors::VisualizerError;
use serde::{Deserialize, Serialize};

/// A comparison sort the engine knows how to step through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Bubble,
    Merge,
    Quick,
}

impl Algorithm {
    /// Every algorithm, in the order the controls list them.
    pub const ALL: [Algorithm; 3] = [Algorithm::Bubble, Algorithm::Merge, Algorithm::Quick];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Algorithm::Bubble => "Bubble Sort",
            Algorithm::Merge => "Merge Sort",
            Algorithm::Quick => "Quick Sort",
        }
    }

    /// Build the step cursor for a sequence of `len` elements.
    pub fn cursor(self, len: usize) -> StepCursor {
        StepCursor::new(self, len)
    }

    /// Every algorithm except `excluded`, preserving list order.
    pub fn others(excluded: Algorithm) -> Vec<Algorithm> {
        Self::ALL.into_iter().filter(|a| *a != excluded).collect()
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Bubble => write!(f, "bubble"),
            Algorithm::Merge => write!(f, "merge"),
            Algorithm::Quick => write!(f, "quick"),
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = VisualizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bubble" | "bubblesort" | "bubble-sort" => Ok(Algorithm::Bubble),
            "merge" | "mergesort" | "merge-sort" => Ok(Algorithm::Merge),
            "quick" | "quicksort" | "quick-sort" => Ok(Algorithm::Quick),
            _ => Err(VisualizerError::UnknownAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}
