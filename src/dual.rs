//! Two lanes racing against copies of one snapshot.
//!
//! Both lanes are driven by `tokio::join!` on a single task, so they interleave
//! only at suspension points and never run on separate threads.

use crate::engine::{Algorithm, Lane, RunReport, Slot};
use crate::errors::VisualizerError;
use crate::scheduler::StepScheduler;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Algorithm selections for the two slots of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DualRunCoordinator {
    first: Algorithm,
    second: Algorithm,
}

impl Default for DualRunCoordinator {
    fn default() -> Self {
        Self {
            first: Algorithm::Bubble,
            second: Algorithm::Merge,
        }
    }
}

impl DualRunCoordinator {
    /// Build from explicit selections. Identical selections are allowed here
    /// and rejected by [`DualRunCoordinator::start`].
    pub fn new(first: Algorithm, second: Algorithm) -> Self {
        Self { first, second }
    }

    pub fn selection(&self, slot: Slot) -> Algorithm {
        match slot {
            Slot::One => self.first,
            Slot::Two => self.second,
        }
    }

    pub fn selections(&self) -> [Algorithm; 2] {
        [self.first, self.second]
    }

    /// Options offered for a slot. Slot 2 never offers slot 1's choice.
    pub fn options_for(&self, slot: Slot) -> Vec<Algorithm> {
        match slot {
            Slot::One => Algorithm::ALL.to_vec(),
            Slot::Two => Algorithm::others(self.first),
        }
    }

    /// Change one slot's selection.
    ///
    /// Changing slot 1 recomputes slot 2's pool: slot 2 keeps its choice when it
    /// still differs, otherwise it takes the first remaining option.
    pub fn select(&mut self, slot: Slot, algorithm: Algorithm) {
        match slot {
            Slot::One => {
                self.first = algorithm;
                if self.second == algorithm {
                    let pool = Algorithm::others(algorithm);
                    if let Some(&replacement) = pool.first() {
                        debug!(from = %self.second, to = %replacement, "Slot 2 selection replaced");
                        self.second = replacement;
                    }
                }
            }
            Slot::Two => self.second = algorithm,
        }
    }

    /// Check that both selections differ.
    pub fn validate(&self) -> Result<(), VisualizerError> {
        if self.first == self.second {
            return Err(VisualizerError::DuplicateAlgorithmSelection {
                algorithm: self.first,
            });
        }
        Ok(())
    }

    /// Launch both lanes on one task.
    ///
    /// On a duplicate selection nothing is touched and the lanes are handed back
    /// alongside the error.
    pub fn start(
        &self,
        lanes: [Lane; 2],
        scheduler: &StepScheduler,
    ) -> Result<DualRun, (VisualizerError, [Lane; 2])> {
        if let Err(e) = self.validate() {
            warn!(algorithm = %self.first, "Rejected race with identical algorithms");
            return Err((e, lanes));
        }

        let [mut first, mut second] = lanes;
        let assigned = first
            .engine_mut()
            .set_algorithm(self.first)
            .and_then(|_| second.engine_mut().set_algorithm(self.second));
        if let Err(e) = assigned {
            return Err((e, [first, second]));
        }

        debug!(first = %self.first, second = %self.second, "Starting race");
        let scheduler = scheduler.clone();
        let handle = tokio::spawn(async move {
            let (first_result, second_result) =
                tokio::join!(first.run(&scheduler), second.run(&scheduler));
            DualOutcome {
                lanes: [first, second],
                results: [first_result, second_result],
            }
        });

        Ok(DualRun { handle })
    }
}

/// A race in flight.
#[derive(Debug)]
pub struct DualRun {
    handle: JoinHandle<DualOutcome>,
}

impl DualRun {
    /// Wait until both lanes have finished.
    pub async fn join_both(self) -> Result<DualOutcome, VisualizerError> {
        self.handle
            .await
            .map_err(|e| VisualizerError::RunTaskFailed(e.to_string()))
    }
}

/// Both lanes after a race, with each lane's result.
#[derive(Debug)]
pub struct DualOutcome {
    pub lanes: [Lane; 2],
    pub results: [Result<RunReport, VisualizerError>; 2],
}

impl DualOutcome {
    /// Both reports, or the first lane error.
    pub fn reports(&self) -> Result<Vec<RunReport>, VisualizerError> {
        self.results.iter().cloned().collect()
    }
}

/// Summary line data for a finished race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceSummary {
    /// Lane with fewer comparisons plus swaps, `None` on a tie
    pub fewest_steps: Option<Slot>,
    /// Lane with the shorter wall-clock time, `None` on a tie
    pub fastest: Option<Slot>,
}

impl RaceSummary {
    pub fn from_reports(first: &RunReport, second: &RunReport) -> Self {
        let pick = |a: u128, b: u128| match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(first.slot),
            std::cmp::Ordering::Greater => Some(second.slot),
            std::cmp::Ordering::Equal => None,
        };
        Self {
            fewest_steps: pick(first.steps() as u128, second.steps() as u128),
            fastest: pick(first.elapsed.as_millis(), second.elapsed.as_millis()),
        }
    }
}
