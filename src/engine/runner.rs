//! The step driver: pulls steps from a cursor, applies them, counts them,
//! notifies the renderer and suspends between them.

use crate::counters::InstrumentationCounters;
use crate::engine::algorithm::Algorithm;
use crate::engine::events::{RunReport, Slot, SortEvent};
use crate::engine::step::{Step, TerminalMarks};
use crate::errors::VisualizerError;
use crate::scheduler::StepScheduler;
use crate::sequence::SequenceState;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

/// Lifecycle of a single engine run. One forward transition per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    #[default]
    NotStarted,
    Running,
    Finished,
}

impl EngineState {
    pub fn describe(self) -> &'static str {
        match self {
            EngineState::NotStarted => "not started",
            EngineState::Running => "running",
            EngineState::Finished => "finished",
        }
    }
}

/// Drives one algorithm over one sequence.
#[derive(Debug, Clone)]
pub struct SortEngine {
    slot: Slot,
    algorithm: Algorithm,
    state: EngineState,
    event_tx: Option<mpsc::Sender<SortEvent>>,
}

impl SortEngine {
    pub fn new(slot: Slot, algorithm: Algorithm) -> Self {
        Self {
            slot,
            algorithm,
            state: EngineState::NotStarted,
            event_tx: None,
        }
    }

    /// Set the event channel for renderer notifications.
    pub fn with_event_channel(mut self, tx: mpsc::Sender<SortEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Change the algorithm. Not allowed mid-run.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) -> Result<(), VisualizerError> {
        if self.state == EngineState::Running {
            return Err(VisualizerError::InvalidState {
                operation: "change algorithm",
                state: self.state.describe(),
            });
        }
        self.algorithm = algorithm;
        Ok(())
    }

    /// Return a finished engine to `NotStarted` so it can run again.
    pub fn rearm(&mut self) {
        if self.state == EngineState::Finished {
            self.state = EngineState::NotStarted;
        }
    }

    /// Sort `values` step by step.
    ///
    /// Every compare, swap and placement suspends once on `scheduler`; sorted
    /// marks are emitted without pacing. Returns the sorted ranges in the order
    /// they became final.
    pub async fn run(
        &mut self,
        values: &mut [u32],
        counters: &mut InstrumentationCounters,
        scheduler: &StepScheduler,
    ) -> Result<TerminalMarks, VisualizerError> {
        if self.state != EngineState::NotStarted {
            return Err(VisualizerError::InvalidState {
                operation: "start",
                state: self.state.describe(),
            });
        }

        self.state = EngineState::Running;
        info!(slot = %self.slot, algorithm = %self.algorithm, len = values.len(), "Sort run started");
        self.emit(SortEvent::RunStarted {
            slot: self.slot,
            algorithm: self.algorithm,
            len: values.len(),
        })
        .await;

        counters.start_clock();
        let mut cursor = self.algorithm.cursor(values.len());
        let mut marks = TerminalMarks::new();
        let mut open_compare: Option<[usize; 2]> = None;

        while let Some(step) = cursor.next_step(values) {
            trace!(slot = %self.slot, ?step, "step");
            match step {
                Step::Compare { a, b } => {
                    self.close_compare(&mut open_compare).await;
                    open_compare = Some([a, b]);
                    self.emit(SortEvent::CompareStarted {
                        slot: self.slot,
                        indices: [a, b],
                    })
                    .await;
                    counters.record_comparison();
                    self.emit_counters(counters).await;
                }
                Step::Swap { a, b } | Step::Exchange { a, b } => {
                    step.apply(values);
                    counters.record_swap();
                    self.emit(SortEvent::Swapped {
                        slot: self.slot,
                        indices: [a, b],
                        values: [values[a], values[b]],
                    })
                    .await;
                    self.emit_counters(counters).await;
                }
                Step::Place { index, value } => {
                    if step.apply(values) {
                        counters.record_swap();
                    }
                    self.emit(SortEvent::Placed {
                        slot: self.slot,
                        index,
                        value,
                    })
                    .await;
                    self.emit_counters(counters).await;
                }
                Step::MarkSorted { range } => {
                    self.close_compare(&mut open_compare).await;
                    marks.push(range);
                    self.emit(SortEvent::RangeSorted {
                        slot: self.slot,
                        range,
                    })
                    .await;
                }
            }

            if step.is_visible() {
                scheduler.suspend().await;
                // A swap or placement ends the comparison that caused it.
                if !matches!(step, Step::Compare { .. }) {
                    self.close_compare(&mut open_compare).await;
                }
            }

            if let Some(elapsed) = counters.tick_due() {
                self.emit(SortEvent::TimeChanged {
                    slot: self.slot,
                    elapsed_ms: elapsed.as_millis() as u64,
                })
                .await;
            }
        }

        self.close_compare(&mut open_compare).await;
        let elapsed = counters.stop_clock();
        self.emit(SortEvent::TimeChanged {
            slot: self.slot,
            elapsed_ms: elapsed.as_millis() as u64,
        })
        .await;

        self.state = EngineState::Finished;
        info!(
            slot = %self.slot,
            algorithm = %self.algorithm,
            comparisons = counters.comparisons(),
            swaps = counters.swaps(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Sort run finished"
        );
        Ok(marks)
    }

    async fn close_compare(&self, open_compare: &mut Option<[usize; 2]>) {
        if let Some(indices) = open_compare.take() {
            self.emit(SortEvent::CompareEnded {
                slot: self.slot,
                indices,
            })
            .await;
        }
    }

    async fn emit_counters(&self, counters: &InstrumentationCounters) {
        self.emit(SortEvent::CountersChanged {
            slot: self.slot,
            comparisons: counters.comparisons(),
            swaps: counters.swaps(),
        })
        .await;
    }

    /// Emit an event to the event channel if configured.
    async fn emit(&self, event: SortEvent) {
        if let Some(ref tx) = self.event_tx {
            tx.send(event).await.ok();
        }
    }
}

/// One engine bundled with the sequence and counters it exclusively owns.
#[derive(Debug, Clone)]
pub struct Lane {
    engine: SortEngine,
    sequence: SequenceState,
    counters: InstrumentationCounters,
    marks: TerminalMarks,
}

impl Lane {
    pub fn new(slot: Slot, algorithm: Algorithm, sequence: SequenceState) -> Self {
        Self {
            engine: SortEngine::new(slot, algorithm),
            sequence,
            counters: InstrumentationCounters::new(),
            marks: TerminalMarks::new(),
        }
    }

    /// Set the event channel for renderer notifications.
    pub fn with_event_channel(mut self, tx: mpsc::Sender<SortEvent>) -> Self {
        self.engine = self.engine.with_event_channel(tx);
        self
    }

    pub fn slot(&self) -> Slot {
        self.engine.slot()
    }

    pub fn algorithm(&self) -> Algorithm {
        self.engine.algorithm()
    }

    pub fn engine(&self) -> &SortEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SortEngine {
        &mut self.engine
    }

    pub fn sequence(&self) -> &SequenceState {
        &self.sequence
    }

    pub fn counters(&self) -> &InstrumentationCounters {
        &self.counters
    }

    pub fn marks(&self) -> &TerminalMarks {
        &self.marks
    }

    /// Replace the sequence with a fresh snapshot and clear run state.
    pub fn load(&mut self, sequence: SequenceState) {
        self.sequence = sequence;
        self.clear_run();
    }

    /// Restore the snapshot and clear run state.
    pub fn reset(&mut self) {
        self.sequence.reset();
        self.clear_run();
    }

    fn clear_run(&mut self) {
        self.counters.reset();
        self.marks.clear();
        self.engine.rearm();
    }

    /// Run the engine over this lane's own sequence and counters.
    pub async fn run(&mut self, scheduler: &StepScheduler) -> Result<RunReport, VisualizerError> {
        let marks = self
            .engine
            .run(self.sequence.values_mut(), &mut self.counters, scheduler)
            .await?;
        self.marks = marks;

        let report = self.report();
        debug!(slot = %report.slot, steps = report.steps(), "Lane finished");
        self.engine
            .emit(SortEvent::RunFinished {
                slot: report.slot,
                report: Box::new(report.clone()),
            })
            .await;
        Ok(report)
    }

    /// Snapshot of the lane's current outcome.
    pub fn report(&self) -> RunReport {
        RunReport {
            slot: self.slot(),
            algorithm: self.algorithm(),
            values: self.sequence.values().to_vec(),
            comparisons: self.counters.comparisons(),
            swaps: self.counters.swaps(),
            elapsed: self.counters.elapsed(),
            marks: self.marks.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::step::SortedRange;
    use std::time::Duration;

    async fn run_immediate(algorithm: Algorithm, values: Vec<u32>) -> (Vec<u32>, InstrumentationCounters, TerminalMarks) {
        let mut engine = SortEngine::new(Slot::One, algorithm);
        let mut values = values;
        let mut counters = InstrumentationCounters::new();
        let marks = engine
            .run(&mut values, &mut counters, &StepScheduler::immediate())
            .await
            .unwrap();
        assert_eq!(engine.state(), EngineState::Finished);
        (values, counters, marks)
    }

    fn drain_events(rx: &mut mpsc::Receiver<SortEvent>) -> Vec<SortEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_bubble_counts() {
        let (values, counters, marks) = run_immediate(Algorithm::Bubble, vec![5, 3, 8, 1]).await;
        assert_eq!(values, vec![1, 3, 5, 8]);
        assert_eq!(counters.comparisons(), 6);
        assert_eq!(counters.swaps(), 4);
        assert_eq!(marks.len(), 4);
    }

    #[tokio::test]
    async fn test_merge_counts() {
        let (values, counters, marks) = run_immediate(Algorithm::Merge, vec![9, 1, 5, 3]).await;
        assert_eq!(values, vec![1, 3, 5, 9]);
        assert_eq!(counters.comparisons(), 5);
        assert_eq!(marks.last(), Some(&SortedRange::new(0, 3)));
    }

    #[tokio::test]
    async fn test_quick_counts() {
        let (values, counters, marks) = run_immediate(Algorithm::Quick, vec![2, 8, 1, 9]).await;
        assert_eq!(values, vec![1, 2, 8, 9]);
        assert_eq!(counters.comparisons(), 6);
        // Three in-place exchanges, a pivot swapped with itself, two real pivot moves
        assert_eq!(counters.swaps(), 6);
        assert_eq!(marks[0], SortedRange::single(3));
    }

    #[tokio::test]
    async fn test_run_twice_is_rejected_until_rearmed() {
        let scheduler = StepScheduler::immediate();
        let mut engine = SortEngine::new(Slot::One, Algorithm::Quick);
        let mut values = vec![3, 1, 2];
        let mut counters = InstrumentationCounters::new();
        engine.run(&mut values, &mut counters, &scheduler).await.unwrap();

        let err = engine
            .run(&mut values, &mut counters, &scheduler)
            .await
            .unwrap_err();
        assert!(err.is_ignorable());

        engine.rearm();
        assert_eq!(engine.state(), EngineState::NotStarted);
    }

    #[tokio::test]
    async fn test_each_visible_step_suspends_once() {
        let scheduler = StepScheduler::immediate();
        let mut engine = SortEngine::new(Slot::One, Algorithm::Bubble);
        let mut values = vec![5, 3, 8, 1];
        let mut counters = InstrumentationCounters::new();
        engine.run(&mut values, &mut counters, &scheduler).await.unwrap();
        // 6 compares + 4 swaps
        assert_eq!(scheduler.suspensions(), 10);
    }

    #[tokio::test]
    async fn test_event_order_for_compare_and_swap() {
        let (tx, mut rx) = mpsc::channel(256);
        let mut engine = SortEngine::new(Slot::Two, Algorithm::Bubble).with_event_channel(tx);
        let mut values = vec![2, 1];
        let mut counters = InstrumentationCounters::new();
        engine
            .run(&mut values, &mut counters, &StepScheduler::immediate())
            .await
            .unwrap();

        let events = drain_events(&mut rx);
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                SortEvent::RunStarted { .. } => "start",
                SortEvent::CompareStarted { .. } => "compare",
                SortEvent::CompareEnded { .. } => "compare_end",
                SortEvent::Swapped { .. } => "swap",
                SortEvent::CountersChanged { .. } => "counters",
                SortEvent::RangeSorted { .. } => "sorted",
                SortEvent::TimeChanged { .. } => "time",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "start",
                "compare",
                "counters",
                "swap",
                "counters",
                "compare_end",
                "sorted",
                "sorted",
                "time"
            ]
        );
        assert!(events.iter().all(|e| e.slot() == Slot::Two));
        assert!(events.contains(&SortEvent::Swapped {
            slot: Slot::Two,
            indices: [0, 1],
            values: [1, 2],
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_matches_paced_steps() {
        let scheduler = StepScheduler::new(Duration::from_millis(10));
        let mut engine = SortEngine::new(Slot::One, Algorithm::Bubble);
        let mut values = vec![5, 3, 8, 1];
        let mut counters = InstrumentationCounters::new();
        engine.run(&mut values, &mut counters, &scheduler).await.unwrap();
        // 10 visible steps at 10ms each
        assert_eq!(counters.elapsed(), Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_change_mid_run_only_affects_later_steps() {
        let scheduler = StepScheduler::new(Duration::from_millis(100));
        let controller = scheduler.clone();
        let mut lane = Lane::new(
            Slot::One,
            Algorithm::Bubble,
            SequenceState::from_values(vec![5, 3, 8, 1]),
        );

        let run = tokio::spawn(async move {
            let report = lane.run(&scheduler).await.unwrap();
            (report, scheduler.suspensions())
        });

        // Let the first two steps (compare + swap) finish and the third begin.
        tokio::time::sleep(Duration::from_millis(250)).await;
        controller.set_delay(Duration::from_millis(10));

        let (report, suspensions) = run.await.unwrap();
        assert_eq!(suspensions, 10);
        // Steps 1-3 ran at 100ms, the remaining 7 at 10ms
        assert_eq!(report.elapsed, Duration::from_millis(370));
    }

    #[tokio::test]
    async fn test_lane_reset_restores_snapshot() {
        let scheduler = StepScheduler::immediate();
        let mut lane = Lane::new(
            Slot::One,
            Algorithm::Merge,
            SequenceState::from_values(vec![4, 1, 3]),
        );
        let report = lane.run(&scheduler).await.unwrap();
        assert!(report.is_sorted());
        assert!(!lane.sequence().is_clean_from_original());

        for _ in 0..2 {
            lane.reset();
            assert_eq!(lane.sequence().values(), &[4, 1, 3]);
            assert_eq!(lane.counters().comparisons(), 0);
            assert_eq!(lane.counters().swaps(), 0);
            assert!(lane.marks().is_empty());
            assert_eq!(lane.engine().state(), EngineState::NotStarted);
        }
    }
}
