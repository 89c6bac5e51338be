//! The controller: wires one or two lanes to one shared scheduler and applies
//! lifecycle commands.
//!
//! Commands issued in the wrong state (generate while running, start twice)
//! are logged and ignored: they return `Ok(false)` instead of an error.

use crate::config::VisualizerConfig;
use crate::dual::{DualRun, DualRunCoordinator};
use crate::engine::{Algorithm, Lane, RunReport, Slot, SortEvent};
use crate::errors::VisualizerError;
use crate::scheduler::{DelayPreset, SpeedControl, StepScheduler};
use crate::sequence::SequenceState;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Controller-level lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Finished,
}

impl RunState {
    fn describe(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Finished => "finished",
        }
    }
}

/// One visualiser, or two racing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single,
    Dual,
}

#[derive(Debug)]
enum LaneSet {
    Single(Lane),
    Dual([Lane; 2]),
}

impl LaneSet {
    fn as_slice(&self) -> &[Lane] {
        match self {
            LaneSet::Single(lane) => std::slice::from_ref(lane),
            LaneSet::Dual(lanes) => lanes,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [Lane] {
        match self {
            LaneSet::Single(lane) => std::slice::from_mut(lane),
            LaneSet::Dual(lanes) => lanes,
        }
    }
}

#[derive(Debug)]
enum InFlight {
    Single(JoinHandle<(Lane, Result<RunReport, VisualizerError>)>),
    Dual(DualRun),
}

/// Controller over one or two lanes.
#[derive(Debug)]
pub struct Visualizer {
    mode: Mode,
    rng: StdRng,
    snapshot: SequenceState,
    /// `None` while a run owns the lanes
    lanes: Option<LaneSet>,
    coordinator: DualRunCoordinator,
    scheduler: StepScheduler,
    speed: SpeedControl,
    state: RunState,
    in_flight: Option<InFlight>,
    event_tx: Option<mpsc::Sender<SortEvent>>,
}

impl Visualizer {
    /// Build a controller from layered configuration.
    ///
    /// Lanes start empty; call [`Visualizer::generate`] before starting.
    pub fn new(config: &VisualizerConfig, mode: Mode) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (first, second) = config.race_selections();
        let coordinator = match mode {
            Mode::Single => DualRunCoordinator::new(config.algorithm, second),
            Mode::Dual => DualRunCoordinator::new(first, second),
        };

        let mut visualizer = Self {
            mode,
            rng,
            snapshot: SequenceState::default(),
            lanes: None,
            coordinator,
            scheduler: StepScheduler::new(config.delay),
            speed: config.speed_control(),
            state: RunState::Idle,
            in_flight: None,
            event_tx: None,
        };
        visualizer.lanes = Some(visualizer.build_lanes());
        visualizer
    }

    /// Set the event channel for renderer notifications.
    pub fn with_event_channel(mut self, tx: mpsc::Sender<SortEvent>) -> Self {
        self.event_tx = Some(tx);
        self.lanes = Some(self.build_lanes());
        self
    }

    fn build_lanes(&self) -> LaneSet {
        let lane = |slot: Slot| {
            let lane = Lane::new(slot, self.coordinator.selection(slot), self.snapshot.clone());
            match &self.event_tx {
                Some(tx) => lane.with_event_channel(tx.clone()),
                None => lane,
            }
        };
        match self.mode {
            Mode::Single => LaneSet::Single(lane(Slot::One)),
            Mode::Dual => LaneSet::Dual([lane(Slot::One), lane(Slot::Two)]),
        }
    }

    /// Controller lifecycle. Stays `Running` until [`Visualizer::wait`] has
    /// collected the lanes, even if both engines are already done.
    pub fn run_state(&self) -> RunState {
        self.state
    }

    /// Lanes for read access; empty while a run is in flight.
    pub fn lanes(&self) -> &[Lane] {
        self.lanes.as_ref().map(LaneSet::as_slice).unwrap_or(&[])
    }

    /// The shared scheduler. Clones retune the live run.
    pub fn scheduler(&self) -> &StepScheduler {
        &self.scheduler
    }

    pub fn speed_control(&self) -> &SpeedControl {
        &self.speed
    }

    pub fn selection(&self, slot: Slot) -> Algorithm {
        self.coordinator.selection(slot)
    }

    fn ignored(&self, operation: &'static str) -> Result<bool, VisualizerError> {
        let err = VisualizerError::InvalidState {
            operation,
            state: self.state.describe(),
        };
        debug!(error = %err, "Command ignored");
        Ok(false)
    }

    fn check_slot(&self, slot: Slot) -> Result<(), VisualizerError> {
        if self.mode == Mode::Single && slot != Slot::One {
            return Err(VisualizerError::InvalidSlot { slot: slot.into() });
        }
        Ok(())
    }

    /// Draw a new sequence and load a copy into every lane.
    pub async fn generate(&mut self, size: usize) -> Result<bool, VisualizerError> {
        if self.state == RunState::Running {
            return self.ignored("generate");
        }

        let mut snapshot = SequenceState::default();
        snapshot.generate(size, &mut self.rng)?;
        self.snapshot = snapshot;

        let mut generated = Vec::new();
        if let Some(lanes) = self.lanes.as_mut() {
            for lane in lanes.as_mut_slice() {
                lane.load(self.snapshot.clone());
                generated.push(SortEvent::Generated {
                    slot: lane.slot(),
                    values: lane.sequence().values().to_vec(),
                });
            }
        }
        for event in generated {
            self.emit(event).await;
        }

        self.state = RunState::Idle;
        info!(size, "Generated sequence");
        Ok(true)
    }

    /// Choose the algorithm for a slot.
    pub fn set_algorithm(&mut self, slot: Slot, algorithm: Algorithm) -> Result<bool, VisualizerError> {
        self.check_slot(slot)?;
        if self.state == RunState::Running {
            return self.ignored("change algorithm");
        }

        self.coordinator.select(slot, algorithm);
        let selections = self.coordinator.selections();
        if let Some(lanes) = self.lanes.as_mut() {
            for lane in lanes.as_mut_slice() {
                let selected = selections[lane.slot().index()];
                lane.engine_mut().set_algorithm(selected)?;
            }
        }
        debug!(%slot, %algorithm, "Algorithm selected");
        Ok(true)
    }

    /// Algorithms a slot may choose from.
    pub fn algorithm_options(&self, slot: Slot) -> Result<Vec<Algorithm>, VisualizerError> {
        self.check_slot(slot)?;
        Ok(match self.mode {
            Mode::Single => Algorithm::ALL.to_vec(),
            Mode::Dual => self.coordinator.options_for(slot),
        })
    }

    /// Apply a speed control value. Takes effect on the next step, even mid-run.
    pub fn set_delay(&self, value: u32) -> Result<Duration, VisualizerError> {
        let delay = self.scheduler.set_control_value(&self.speed, value)?;
        debug!(value, delay_ms = delay.as_millis() as u64, "Step delay changed");
        Ok(delay)
    }

    pub fn set_delay_preset(&self, preset: DelayPreset) -> Duration {
        self.scheduler.set_preset(preset);
        debug!(%preset, "Step delay preset applied");
        self.scheduler.delay()
    }

    /// Start every lane.
    ///
    /// Ignored while running or when any lane no longer matches its snapshot.
    /// A race with identical algorithms fails with `DuplicateAlgorithmSelection`.
    pub async fn start(&mut self) -> Result<bool, VisualizerError> {
        if self.state == RunState::Running {
            return self.ignored("start");
        }
        if self.mode == Mode::Dual {
            if let Err(e) = self.coordinator.validate() {
                warn!(error = %e, "Race rejected");
                return Err(e);
            }
        }
        let Some(mut lanes) = self.lanes.take() else {
            return self.ignored("start");
        };

        if !lanes.as_slice().iter().all(|l| l.sequence().is_clean_from_original()) {
            self.lanes = Some(lanes);
            debug!("Start ignored: sequence differs from its snapshot; reset first");
            return Ok(false);
        }
        if self.state == RunState::Finished {
            // Already-sorted input stays clean after a run; re-arm it.
            for lane in lanes.as_mut_slice() {
                lane.reset();
            }
        }

        let scheduler = self.scheduler.clone();
        let in_flight = match lanes {
            LaneSet::Single(mut lane) => InFlight::Single(tokio::spawn(async move {
                let result = lane.run(&scheduler).await;
                (lane, result)
            })),
            LaneSet::Dual(lanes) => match self.coordinator.start(lanes, &scheduler) {
                Ok(run) => InFlight::Dual(run),
                Err((e, lanes)) => {
                    self.lanes = Some(LaneSet::Dual(lanes));
                    warn!(error = %e, "Race rejected");
                    return Err(e);
                }
            },
        };

        self.in_flight = Some(in_flight);
        self.state = RunState::Running;
        info!(mode = ?self.mode, "Run started");
        Ok(true)
    }

    /// Wait for the run in flight to finish and return one report per lane.
    ///
    /// Returns an empty list when nothing is running.
    pub async fn wait(&mut self) -> Result<Vec<RunReport>, VisualizerError> {
        let Some(in_flight) = self.in_flight.take() else {
            debug!("Wait ignored: nothing in flight");
            return Ok(Vec::new());
        };

        let joined = match in_flight {
            InFlight::Single(handle) => handle
                .await
                .map_err(|e| VisualizerError::RunTaskFailed(e.to_string()))
                .map(|(lane, result)| (LaneSet::Single(lane), result.map(|r| vec![r]))),
            InFlight::Dual(run) => run.join_both().await.map(|outcome| {
                let reports = outcome.reports();
                (LaneSet::Dual(outcome.lanes), reports)
            }),
        };

        self.state = RunState::Finished;
        match joined {
            Ok((lanes, reports)) => {
                self.lanes = Some(lanes);
                reports
            }
            Err(e) => {
                // The lanes went down with the task; rebuild them from the snapshot.
                warn!(error = %e, "Run task failed");
                self.lanes = Some(self.build_lanes());
                self.state = RunState::Idle;
                Err(e)
            }
        }
    }

    /// Restore every lane to the snapshot and clear counters and marks.
    pub async fn reset(&mut self) -> Result<bool, VisualizerError> {
        if self.state == RunState::Running {
            return self.ignored("reset");
        }

        let mut resets = Vec::new();
        if let Some(lanes) = self.lanes.as_mut() {
            for lane in lanes.as_mut_slice() {
                lane.reset();
                resets.push(SortEvent::Reset {
                    slot: lane.slot(),
                    values: lane.sequence().values().to_vec(),
                });
            }
        }
        for event in resets {
            self.emit(event).await;
        }

        self.state = RunState::Idle;
        Ok(true)
    }

    /// Emit an event to the event channel if configured.
    async fn emit(&self, event: SortEvent) {
        if let Some(ref tx) = self.event_tx {
            tx.send(event).await.ok();
        }
    }
}
