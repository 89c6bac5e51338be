//! The array under sort and the snapshot it was generated from.

use crate::errors::{MAX_SEQUENCE_LEN, VisualizerError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Smallest value that can appear in a sequence.
pub const MIN_VALUE: u32 = 1;
/// Largest value that can appear in a sequence.
pub const MAX_VALUE: u32 = 99;

/// Bar counts offered by the controls.
pub const SIZE_PRESETS: [usize; 3] = [8, 16, 32];

/// Mutable sequence plus the immutable snapshot taken when it was generated.
///
/// The snapshot only changes on [`SequenceState::generate`]; everything else
/// (sorting, reset) works against `values`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceState {
    values: Vec<u32>,
    original: Vec<u32>,
}

impl SequenceState {
    /// Wrap an existing sequence, taking it as the original snapshot.
    pub fn from_values(values: Vec<u32>) -> Self {
        Self {
            original: values.clone(),
            values,
        }
    }

    /// Draw `size` unique values in `MIN_VALUE..=MAX_VALUE`.
    ///
    /// Sampling is done without replacement, so it terminates for every size
    /// up to [`MAX_SEQUENCE_LEN`]; anything larger is rejected up front.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        size: usize,
        rng: &mut R,
    ) -> Result<(), VisualizerError> {
        if size > MAX_SEQUENCE_LEN {
            return Err(VisualizerError::InvalidSize {
                requested: size,
                max: MAX_SEQUENCE_LEN,
            });
        }

        let values: Vec<u32> = rand::seq::index::sample(rng, MAX_VALUE as usize, size)
            .into_iter()
            .map(|i| i as u32 + MIN_VALUE)
            .collect();

        self.original = values.clone();
        self.values = values;
        Ok(())
    }

    /// Whether the current values still match the snapshot element for element.
    pub fn is_clean_from_original(&self) -> bool {
        self.values == self.original
    }

    /// Restore the snapshot.
    pub fn reset(&mut self) {
        self.values.clone_from(&self.original);
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [u32] {
        &mut self.values
    }

    pub fn original(&self) -> &[u32] {
        &self.original
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_generate_unique_values_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for size in [0, 1, 8, 16, 32, 98, 99] {
            let mut seq = SequenceState::default();
            seq.generate(size, &mut rng).unwrap();

            assert_eq!(seq.len(), size);
            let unique: HashSet<_> = seq.values().iter().collect();
            assert_eq!(unique.len(), size, "values must be unique for size {}", size);
            assert!(
                seq.values()
                    .iter()
                    .all(|v| (MIN_VALUE..=MAX_VALUE).contains(v))
            );
            assert!(seq.is_clean_from_original());
        }
    }

    #[test]
    fn test_generate_rejects_oversized() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut seq = SequenceState::from_values(vec![3, 1, 2]);

        let err = seq.generate(100, &mut rng).unwrap_err();
        assert_eq!(
            err,
            VisualizerError::InvalidSize {
                requested: 100,
                max: 99
            }
        );
        // Untouched on failure
        assert_eq!(seq.values(), &[3, 1, 2]);
    }

    #[test]
    fn test_generate_replaces_snapshot() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut seq = SequenceState::from_values(vec![1, 2]);
        seq.generate(8, &mut rng).unwrap();
        assert_eq!(seq.original(), seq.values());
        assert_eq!(seq.len(), 8);
    }

    #[test]
    fn test_clean_check_and_reset() {
        let mut seq = SequenceState::from_values(vec![4, 2, 9]);
        assert!(seq.is_clean_from_original());

        seq.values_mut().swap(0, 1);
        assert!(!seq.is_clean_from_original());
        assert_eq!(seq.original(), &[4, 2, 9]);

        seq.reset();
        assert!(seq.is_clean_from_original());
        assert_eq!(seq.values(), &[4, 2, 9]);

        // Reset is idempotent
        seq.reset();
        assert_eq!(seq.values(), &[4, 2, 9]);
    }
}
