//! Typed errors for the sort visualiser core.
//!
//! Every variant is a precondition violation; nothing in the core performs I/O,
//! so there are no transient failures and nothing is retried.

use crate::engine::Algorithm;
use thiserror::Error;

/// Largest number of unique values a sequence can hold (values are drawn from 1..=99).
pub const MAX_SEQUENCE_LEN: usize = 99;

/// Errors raised by the sequence, engine, coordinator and controller layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisualizerError {
    #[error("Cannot draw {requested} unique values from 1..={max}")]
    InvalidSize { requested: usize, max: usize },

    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Both visualisers cannot use the same algorithm ({algorithm})")]
    DuplicateAlgorithmSelection { algorithm: Algorithm },

    #[error("Unknown algorithm '{name}'. Valid values: bubble, merge, quick")]
    UnknownAlgorithm { name: String },

    #[error("Invalid slot {slot}: expected 1 or 2")]
    InvalidSlot { slot: u8 },

    #[error("Speed control value {value} is outside 0..={max}")]
    InvalidDelay { value: u32, max: u32 },

    #[error("Sort task stopped before finishing: {0}")]
    RunTaskFailed(String),
}

impl VisualizerError {
    /// Whether this error is wrong-state misuse that the controller absorbs as a no-op.
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_size_carries_requested_and_max() {
        let err = VisualizerError::InvalidSize {
            requested: 120,
            max: MAX_SEQUENCE_LEN,
        };
        match &err {
            VisualizerError::InvalidSize { requested, max } => {
                assert_eq!(*requested, 120);
                assert_eq!(*max, 99);
            }
            _ => panic!("Expected InvalidSize"),
        }
        assert!(err.to_string().contains("120"));
    }

    #[test]
    fn duplicate_selection_names_the_algorithm() {
        let err = VisualizerError::DuplicateAlgorithmSelection {
            algorithm: Algorithm::Merge,
        };
        assert_eq!(
            err.to_string(),
            "Both visualisers cannot use the same algorithm (merge)"
        );
    }

    #[test]
    fn only_invalid_state_is_ignorable() {
        let state = VisualizerError::InvalidState {
            operation: "start",
            state: "running",
        };
        assert!(state.is_ignorable());
        assert_eq!(state.to_string(), "Cannot start while running");

        let dup = VisualizerError::DuplicateAlgorithmSelection {
            algorithm: Algorithm::Bubble,
        };
        assert!(!dup.is_ignorable());
        assert!(!VisualizerError::InvalidSlot { slot: 3 }.is_ignorable());
    }

    #[test]
    fn all_variants_implement_std_error() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&VisualizerError::RunTaskFailed("panicked".into()));
        assert_std_error(&VisualizerError::UnknownAlgorithm {
            name: "bogo".into(),
        });
    }
}
