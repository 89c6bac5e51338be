//! Bar chart renderer.
//!
//! Draws each lane as one horizontal bar per element and reacts to
//! [`SortEvent`]s from the engine. It supports multiple output modes:
//! - `full`: one progress bar per element, coloured by highlight
//! - `minimal`: one line per lane when a run starts and finishes
//! - `json`: every event as one JSON line on stdout

use crate::dual::RaceSummary;
use crate::engine::{Algorithm, RunReport, Slot, SortEvent, SortedRange};
use crate::sequence::MAX_VALUE;
use crate::ui::icons::{CHART, CHECK, CLOCK, RUNNING, SHUFFLE, SPARKLE, TROPHY};
use console::{Term, style};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

/// Output mode for the chart UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    /// Bar chart with live highlights and counters
    #[default]
    Full,
    /// Start and finish lines only
    Minimal,
    /// JSON-formatted events
    Json,
}

impl std::str::FromStr for UiMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s).unwrap_or_default())
    }
}

impl UiMode {
    /// Strict lookup by name; `None` for anything but full, minimal or json.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Some(Self::Full),
            "minimal" => Some(Self::Minimal),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl std::fmt::Display for UiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UiMode::Full => write!(f, "full"),
            UiMode::Minimal => write!(f, "minimal"),
            UiMode::Json => write!(f, "json"),
        }
    }
}

/// How a single bar is currently drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Default,
    Comparing,
    Swapping,
    Sorted,
}

impl Highlight {
    fn template(self) -> &'static str {
        match self {
            Highlight::Default => "{prefix:>4} {bar:50.cyan/black} {pos:>2}",
            Highlight::Comparing => "{prefix:>4} {bar:50.yellow/black} {pos:>2}",
            Highlight::Swapping => "{prefix:>4} {bar:50.red/black} {pos:>2}",
            Highlight::Sorted => "{prefix:>4} {bar:50.green/black} {pos:>2}",
        }
    }

    fn style(self) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(self.template())
            .expect("progress bar template is a valid static string")
            .progress_chars("█▌ ")
    }
}

/// Display state for one lane.
#[derive(Debug)]
struct LaneView {
    header: ProgressBar,
    bars: Vec<ProgressBar>,
    counters: ProgressBar,
    highlights: Vec<Highlight>,
    /// Bars highlighted by a swap or placement, cleared by the next compare or mark
    transient: Vec<usize>,
    algorithm: Option<Algorithm>,
    comparisons: u64,
    swaps: u64,
    elapsed: Duration,
}

impl LaneView {
    fn counters_message(&self) -> String {
        format!(
            "{}Comparisons: {}  Swaps: {}  {}{}",
            CHART,
            style(self.comparisons).cyan(),
            style(self.swaps).cyan(),
            CLOCK,
            style(format_duration(self.elapsed)).yellow()
        )
    }

    fn header_message(&self) -> String {
        match self.algorithm {
            Some(algorithm) => style(algorithm.label()).bold().to_string(),
            None => style("Idle").dim().to_string(),
        }
    }
}

/// Bar chart UI for one or two lanes.
///
/// Owned by the display task; every update goes through [`ChartUI::handle_event`].
pub struct ChartUI {
    mode: UiMode,
    multi: MultiProgress,
    styles: [ProgressStyle; 4],
    lanes: BTreeMap<Slot, LaneView>,
    verbose: bool,
    term: Term,
}

impl ChartUI {
    /// Create a new chart UI.
    pub fn new(mode: UiMode, verbose: bool) -> Self {
        Self {
            mode,
            multi: MultiProgress::new(),
            styles: [
                Highlight::Default.style(),
                Highlight::Comparing.style(),
                Highlight::Swapping.style(),
                Highlight::Sorted.style(),
            ],
            lanes: BTreeMap::new(),
            verbose,
            term: Term::stdout(),
        }
    }

    /// Highlight currently shown for one bar (full mode only).
    pub fn highlight_at(&self, slot: Slot, index: usize) -> Option<Highlight> {
        self.lanes.get(&slot)?.highlights.get(index).copied()
    }

    /// Values currently drawn for a lane (full mode only).
    pub fn drawn_values(&self, slot: Slot) -> Option<Vec<u32>> {
        let lane = self.lanes.get(&slot)?;
        Some(lane.bars.iter().map(|b| b.position() as u32).collect())
    }

    /// Handle a SortEvent and update the UI accordingly.
    pub fn handle_event(&mut self, event: &SortEvent) {
        match self.mode {
            UiMode::Json => self.handle_json(event),
            UiMode::Minimal => self.handle_minimal(event),
            UiMode::Full => self.handle_full(event),
        }
    }

    /// Handle event in JSON mode - just serialize and print.
    fn handle_json(&self, event: &SortEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(&self.term, "{}", json);
        }
    }

    /// Handle event in minimal mode - start and finish lines.
    fn handle_minimal(&self, event: &SortEvent) {
        match event {
            SortEvent::Generated { slot, values } if self.verbose => {
                let _ = writeln!(&self.term, "{}[{}] {:?}", SHUFFLE, slot, values);
            }
            SortEvent::RunStarted {
                slot,
                algorithm,
                len,
            } => {
                let _ = writeln!(
                    &self.term,
                    "{}[{}] {} on {} elements",
                    RUNNING,
                    slot,
                    algorithm.label(),
                    len
                );
            }
            SortEvent::RunFinished { slot, report } => {
                let _ = writeln!(
                    &self.term,
                    "{}[{}] {}: {} comparisons, {} swaps in {}",
                    CHECK,
                    slot,
                    report.algorithm.label(),
                    report.comparisons,
                    report.swaps,
                    format_duration(report.elapsed)
                );
            }
            _ => {}
        }
    }

    /// Handle event in full mode - live bar chart.
    fn handle_full(&mut self, event: &SortEvent) {
        match event {
            SortEvent::Generated { slot, values } => self.on_generated(*slot, values),
            SortEvent::Reset { slot, values } => self.on_reset(*slot, values),
            SortEvent::RunStarted {
                slot, algorithm, ..
            } => {
                if let Some(lane) = self.lanes.get_mut(slot) {
                    lane.algorithm = Some(*algorithm);
                    lane.header
                        .set_message(format!("{}{}", RUNNING, lane.header_message()));
                }
            }
            SortEvent::CompareStarted { slot, indices } => {
                self.clear_transient(*slot);
                for &index in indices {
                    self.set_highlight(*slot, index, Highlight::Comparing);
                }
            }
            SortEvent::CompareEnded { slot, indices } => {
                self.clear_transient(*slot);
                for &index in indices {
                    self.set_highlight(*slot, index, Highlight::Default);
                }
            }
            SortEvent::Swapped {
                slot,
                indices,
                values,
            } => {
                for (&index, &value) in indices.iter().zip(values) {
                    self.set_value(*slot, index, value);
                    self.set_highlight(*slot, index, Highlight::Swapping);
                    self.mark_transient(*slot, index);
                }
            }
            SortEvent::Placed { slot, index, value } => {
                self.set_value(*slot, *index, *value);
                self.set_highlight(*slot, *index, Highlight::Swapping);
                self.mark_transient(*slot, *index);
            }
            SortEvent::RangeSorted { slot, range } => {
                self.clear_transient(*slot);
                self.on_range_sorted(*slot, *range);
            }
            SortEvent::CountersChanged {
                slot,
                comparisons,
                swaps,
            } => {
                if let Some(lane) = self.lanes.get_mut(slot) {
                    lane.comparisons = *comparisons;
                    lane.swaps = *swaps;
                    lane.counters.set_message(lane.counters_message());
                }
            }
            SortEvent::TimeChanged { slot, elapsed_ms } => {
                if let Some(lane) = self.lanes.get_mut(slot) {
                    lane.elapsed = Duration::from_millis(*elapsed_ms);
                    lane.counters.set_message(lane.counters_message());
                }
            }
            SortEvent::RunFinished { slot, report } => self.on_run_finished(*slot, report),
        }
    }

    /// Handle a new sequence: rebuild the lane's bars.
    fn on_generated(&mut self, slot: Slot, values: &[u32]) {
        if let Some(old) = self.lanes.remove(&slot) {
            self.multi.remove(&old.header);
            for bar in &old.bars {
                self.multi.remove(bar);
            }
            self.multi.remove(&old.counters);
        }

        let header = self.multi.add(ProgressBar::new(0));
        header.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:.bold.cyan} {msg}")
                .expect("progress bar template is a valid static string"),
        );
        header.set_prefix(format!("[{}]", slot));

        let bars = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let bar = self.multi.add(ProgressBar::new(MAX_VALUE as u64));
                bar.set_style(self.styles[0].clone());
                bar.set_prefix(i.to_string());
                bar.set_position(value as u64);
                bar
            })
            .collect();

        let counters = self.multi.add(ProgressBar::new(0));
        counters.set_style(
            ProgressStyle::default_bar()
                .template("     {msg}")
                .expect("progress bar template is a valid static string"),
        );

        let lane = LaneView {
            header,
            bars,
            counters,
            highlights: vec![Highlight::Default; values.len()],
            transient: Vec::new(),
            algorithm: None,
            comparisons: 0,
            swaps: 0,
            elapsed: Duration::ZERO,
        };
        lane.header.set_message(lane.header_message());
        lane.counters.set_message(lane.counters_message());
        self.lanes.insert(slot, lane);
    }

    /// Handle a reset: redraw the snapshot and clear every highlight.
    fn on_reset(&mut self, slot: Slot, values: &[u32]) {
        let Some(lane) = self.lanes.get(&slot) else {
            self.on_generated(slot, values);
            return;
        };
        if lane.bars.len() != values.len() {
            self.on_generated(slot, values);
            return;
        }

        for (index, &value) in values.iter().enumerate() {
            self.set_value(slot, index, value);
            self.paint(slot, index, Highlight::Default);
        }
        if let Some(lane) = self.lanes.get_mut(&slot) {
            lane.transient.clear();
            lane.comparisons = 0;
            lane.swaps = 0;
            lane.elapsed = Duration::ZERO;
            lane.counters.set_message(lane.counters_message());
            lane.header.set_message(lane.header_message());
        }
    }

    fn on_range_sorted(&mut self, slot: Slot, range: SortedRange) {
        for index in range.start..=range.end {
            self.set_highlight(slot, index, Highlight::Sorted);
        }
    }

    fn on_run_finished(&mut self, slot: Slot, report: &RunReport) {
        let Some(lane) = self.lanes.get_mut(&slot) else {
            return;
        };
        lane.comparisons = report.comparisons;
        lane.swaps = report.swaps;
        lane.elapsed = report.elapsed;
        lane.counters.set_message(lane.counters_message());
        lane.header.set_message(format!("{}{}", CHECK, lane.header_message()));

        if self.verbose {
            self.multi
                .println(format!(
                    "  {} Lane {} {} in {}",
                    SPARKLE,
                    style(slot).cyan(),
                    style("sorted").green(),
                    format_duration(report.elapsed)
                ))
                .ok();
        }
    }

    /// Sorted bars keep their colour until the next reset.
    fn set_highlight(&mut self, slot: Slot, index: usize, highlight: Highlight) {
        if self.highlight_at(slot, index) != Some(Highlight::Sorted) {
            self.paint(slot, index, highlight);
        }
    }

    fn paint(&mut self, slot: Slot, index: usize, highlight: Highlight) {
        let Some(lane) = self.lanes.get_mut(&slot) else {
            return;
        };
        let Some(current) = lane.highlights.get_mut(index) else {
            return;
        };
        if *current != highlight {
            *current = highlight;
            let style = match highlight {
                Highlight::Default => &self.styles[0],
                Highlight::Comparing => &self.styles[1],
                Highlight::Swapping => &self.styles[2],
                Highlight::Sorted => &self.styles[3],
            };
            lane.bars[index].set_style(style.clone());
        }
    }

    fn set_value(&mut self, slot: Slot, index: usize, value: u32) {
        if let Some(bar) = self.lanes.get(&slot).and_then(|l| l.bars.get(index)) {
            bar.set_position(value as u64);
        }
    }

    fn mark_transient(&mut self, slot: Slot, index: usize) {
        if let Some(lane) = self.lanes.get_mut(&slot) {
            lane.transient.push(index);
        }
    }

    fn clear_transient(&mut self, slot: Slot) {
        let transient = match self.lanes.get_mut(&slot) {
            Some(lane) => std::mem::take(&mut lane.transient),
            None => return,
        };
        for index in transient {
            self.set_highlight(slot, index, Highlight::Default);
        }
    }

    /// Print the run header (full mode only).
    pub fn print_header(&self, title: &str, delay: Duration) {
        if self.mode != UiMode::Full {
            return;
        }
        self.multi.println("").ok();
        self.multi
            .println(format!("{}", style(title).bold().cyan()))
            .ok();
        self.multi
            .println(format!(
                "Step delay: {}  {}",
                format_duration(delay),
                style("(+/- to change speed)").dim()
            ))
            .ok();
        self.multi.println("─".repeat(60)).ok();
    }

    /// Leave the final chart on screen.
    pub fn finish(&self) {
        for lane in self.lanes.values() {
            lane.header.finish();
            for bar in &lane.bars {
                bar.finish();
            }
            lane.counters.finish();
        }
    }

    /// Print the race outcome (full and minimal modes).
    pub fn print_race_summary(&self, reports: &[RunReport], summary: &RaceSummary) {
        if self.mode == UiMode::Json {
            return;
        }
        let name = |slot: Slot| {
            reports
                .iter()
                .find(|r| r.slot == slot)
                .map(|r| r.algorithm.label())
                .unwrap_or("?")
        };

        let _ = writeln!(&self.term);
        match summary.fewest_steps {
            Some(slot) => {
                let _ = writeln!(
                    &self.term,
                    "{}Fewest steps: {} (lane {})",
                    TROPHY,
                    style(name(slot)).green().bold(),
                    slot
                );
            }
            None => {
                let _ = writeln!(&self.term, "{}Fewest steps: tie", TROPHY);
            }
        }
        match summary.fastest {
            Some(slot) => {
                let _ = writeln!(
                    &self.term,
                    "{}Fastest: {} (lane {})",
                    CLOCK,
                    style(name(slot)).green().bold(),
                    slot
                );
            }
            None => {
                let _ = writeln!(&self.term, "{}Fastest: tie", CLOCK);
            }
        }
    }
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        format!("{}ms", d.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_ui(values: &[u32]) -> ChartUI {
        let mut ui = ChartUI::new(UiMode::Full, false);
        ui.handle_event(&SortEvent::Generated {
            slot: Slot::One,
            values: values.to_vec(),
        });
        ui
    }

    #[test]
    fn test_ui_mode_parse() {
        assert_eq!("json".parse::<UiMode>().unwrap(), UiMode::Json);
        assert_eq!("JSON".parse::<UiMode>().unwrap(), UiMode::Json);
        assert_eq!("minimal".parse::<UiMode>().unwrap(), UiMode::Minimal);
        assert_eq!("full".parse::<UiMode>().unwrap(), UiMode::Full);
        assert_eq!("anything_else".parse::<UiMode>().unwrap(), UiMode::Full);
        assert_eq!(UiMode::from_name(" Minimal "), Some(UiMode::Minimal));
        assert_eq!(UiMode::from_name("fancy"), None);
        assert_eq!(UiMode::Minimal.to_string(), "minimal");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0ms");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_millis(1250)), "1.25s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m 1s");
    }

    #[test]
    fn test_generated_draws_values() {
        let ui = full_ui(&[5, 3, 8]);
        assert_eq!(ui.drawn_values(Slot::One), Some(vec![5, 3, 8]));
        assert_eq!(ui.highlight_at(Slot::One, 0), Some(Highlight::Default));
        assert!(ui.drawn_values(Slot::Two).is_none());
    }

    #[test]
    fn test_compare_and_swap_highlights() {
        let mut ui = full_ui(&[5, 3, 8]);
        ui.handle_event(&SortEvent::CompareStarted {
            slot: Slot::One,
            indices: [0, 1],
        });
        assert_eq!(ui.highlight_at(Slot::One, 0), Some(Highlight::Comparing));
        assert_eq!(ui.highlight_at(Slot::One, 2), Some(Highlight::Default));

        ui.handle_event(&SortEvent::Swapped {
            slot: Slot::One,
            indices: [0, 1],
            values: [3, 5],
        });
        assert_eq!(ui.highlight_at(Slot::One, 1), Some(Highlight::Swapping));
        assert_eq!(ui.drawn_values(Slot::One), Some(vec![3, 5, 8]));

        ui.handle_event(&SortEvent::CompareEnded {
            slot: Slot::One,
            indices: [0, 1],
        });
        assert_eq!(ui.highlight_at(Slot::One, 0), Some(Highlight::Default));
        assert_eq!(ui.highlight_at(Slot::One, 1), Some(Highlight::Default));
    }

    #[test]
    fn test_sorted_bars_keep_their_colour() {
        let mut ui = full_ui(&[5, 3, 8]);
        ui.handle_event(&SortEvent::RangeSorted {
            slot: Slot::One,
            range: SortedRange::single(2),
        });
        ui.handle_event(&SortEvent::CompareStarted {
            slot: Slot::One,
            indices: [1, 2],
        });
        assert_eq!(ui.highlight_at(Slot::One, 2), Some(Highlight::Sorted));
        assert_eq!(ui.highlight_at(Slot::One, 1), Some(Highlight::Comparing));
    }

    #[test]
    fn test_placement_highlight_cleared_by_next_compare() {
        let mut ui = full_ui(&[9, 1]);
        ui.handle_event(&SortEvent::Placed {
            slot: Slot::One,
            index: 0,
            value: 1,
        });
        assert_eq!(ui.highlight_at(Slot::One, 0), Some(Highlight::Swapping));
        ui.handle_event(&SortEvent::RangeSorted {
            slot: Slot::One,
            range: SortedRange::new(0, 1),
        });
        assert_eq!(ui.highlight_at(Slot::One, 0), Some(Highlight::Sorted));
    }

    #[test]
    fn test_reset_clears_highlights() {
        let mut ui = full_ui(&[5, 3]);
        ui.handle_event(&SortEvent::Swapped {
            slot: Slot::One,
            indices: [0, 1],
            values: [3, 5],
        });
        ui.handle_event(&SortEvent::RangeSorted {
            slot: Slot::One,
            range: SortedRange::new(0, 1),
        });
        ui.handle_event(&SortEvent::Reset {
            slot: Slot::One,
            values: vec![5, 3],
        });
        assert_eq!(ui.drawn_values(Slot::One), Some(vec![5, 3]));
        assert_eq!(ui.highlight_at(Slot::One, 0), Some(Highlight::Default));
        assert_eq!(ui.highlight_at(Slot::One, 1), Some(Highlight::Default));
    }
}
