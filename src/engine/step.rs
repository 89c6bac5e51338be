//! Algorithm steps and the cursors that produce them.
//!
//! Each algorithm is an explicit state machine. A cursor reads the current
//! values and yields the next [`Step`]; the caller applies the step before
//! asking again. Cursors never sleep or notify, which keeps them testable
//! without a runtime.

use crate::engine::algorithm::Algorithm;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Inclusive index range declared permanently sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedRange {
    pub start: usize,
    pub end: usize,
}

impl SortedRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(index: usize) -> Self {
        Self::new(index, index)
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

/// Ordered sorted-range marks, in the order they became final.
pub type TerminalMarks = Vec<SortedRange>;

/// One observable unit of algorithm work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Compare the values at two positions. Never mutates.
    Compare { a: usize, b: usize },
    /// Exchange the values at two positions.
    Swap { a: usize, b: usize },
    /// Exchange that completes the preceding compare and shares its suspension.
    Exchange { a: usize, b: usize },
    /// Overwrite one position (merge output).
    Place { index: usize, value: u32 },
    /// Declare a range sorted.
    MarkSorted { range: SortedRange },
}

impl Step {
    /// Apply the step to `values`. Returns true when a value changed.
    pub fn apply(&self, values: &mut [u32]) -> bool {
        match *self {
            Step::Swap { a, b } | Step::Exchange { a, b } => {
                values.swap(a, b);
                a != b
            }
            Step::Place { index, value } => {
                let changed = values[index] != value;
                values[index] = value;
                changed
            }
            Step::Compare { .. } | Step::MarkSorted { .. } => false,
        }
    }

    /// Whether this step should be paced by the scheduler.
    pub fn is_visible(&self) -> bool {
        !matches!(self, Step::MarkSorted { .. } | Step::Exchange { .. })
    }
}

/// Step source for one run of one algorithm.
#[derive(Debug, Clone)]
pub enum StepCursor {
    Bubble(BubbleCursor),
    Merge(MergeCursor),
    Quick(QuickCursor),
}

impl StepCursor {
    pub fn new(algorithm: Algorithm, len: usize) -> Self {
        match algorithm {
            Algorithm::Bubble => StepCursor::Bubble(BubbleCursor::new(len)),
            Algorithm::Merge => StepCursor::Merge(MergeCursor::new(len)),
            Algorithm::Quick => StepCursor::Quick(QuickCursor::new(len)),
        }
    }

    /// Next step given the current values, or `None` once the sort is complete.
    pub fn next_step(&mut self, values: &[u32]) -> Option<Step> {
        match self {
            StepCursor::Bubble(cursor) => cursor.next_step(values),
            StepCursor::Merge(cursor) => cursor.next_step(values),
            StepCursor::Quick(cursor) => cursor.next_step(values),
        }
    }

    /// Run to completion against `values`, applying each step. Returns every step taken.
    pub fn drain(mut self, values: &mut [u32]) -> Vec<Step> {
        let mut steps = Vec::new();
        while let Some(step) = self.next_step(values) {
            step.apply(values);
            steps.push(step);
        }
        steps
    }
}

/// Nested-pass bubble sort: `i in 0..n`, `j in 0..n-i-1`.
#[derive(Debug, Clone)]
pub struct BubbleCursor {
    len: usize,
    pass: usize,
    j: usize,
    compared: bool,
}

impl BubbleCursor {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            pass: 0,
            j: 0,
            compared: false,
        }
    }

    fn next_step(&mut self, values: &[u32]) -> Option<Step> {
        while self.pass < self.len {
            let limit = self.len - self.pass - 1;
            if self.j < limit {
                let j = self.j;
                if !self.compared {
                    self.compared = true;
                    return Some(Step::Compare { a: j, b: j + 1 });
                }
                self.compared = false;
                self.j += 1;
                if values[j] > values[j + 1] {
                    return Some(Step::Swap { a: j, b: j + 1 });
                }
                continue;
            }

            self.pass += 1;
            self.j = 0;
            return Some(Step::MarkSorted {
                range: SortedRange::single(limit),
            });
        }
        None
    }
}

/// Top-down merge sort with the merges flattened into post-order.
#[derive(Debug, Clone)]
pub struct MergeCursor {
    pending: VecDeque<(usize, usize, usize)>,
    active: Option<ActiveMerge>,
    lone_element: bool,
}

#[derive(Debug, Clone)]
struct ActiveMerge {
    lo: usize,
    mid: usize,
    hi: usize,
    left: Vec<u32>,
    right: Vec<u32>,
    i: usize,
    j: usize,
    k: usize,
    compared: bool,
}

impl ActiveMerge {
    fn begin(values: &[u32], lo: usize, mid: usize, hi: usize) -> Self {
        Self {
            lo,
            mid,
            hi,
            left: values[lo..=mid].to_vec(),
            right: values[mid + 1..=hi].to_vec(),
            i: 0,
            j: 0,
            k: lo,
            compared: false,
        }
    }

    fn place(&mut self, value: u32) -> Step {
        let index = self.k;
        self.k += 1;
        Step::Place { index, value }
    }
}

impl MergeCursor {
    pub fn new(len: usize) -> Self {
        let mut pending = VecDeque::new();
        if len > 1 {
            plan_merges(0, len - 1, &mut pending);
        }
        Self {
            pending,
            active: None,
            lone_element: len == 1,
        }
    }

    fn next_step(&mut self, values: &[u32]) -> Option<Step> {
        if self.lone_element {
            self.lone_element = false;
            return Some(Step::MarkSorted {
                range: SortedRange::single(0),
            });
        }

        loop {
            let Some(merge) = self.active.as_mut() else {
                let (lo, mid, hi) = self.pending.pop_front()?;
                self.active = Some(ActiveMerge::begin(values, lo, mid, hi));
                continue;
            };

            if merge.i < merge.left.len() && merge.j < merge.right.len() {
                if !merge.compared {
                    merge.compared = true;
                    return Some(Step::Compare {
                        a: merge.lo + merge.i,
                        b: merge.mid + 1 + merge.j,
                    });
                }
                merge.compared = false;
                // Ties take from the left run, keeping the sort stable.
                let value = if merge.left[merge.i] <= merge.right[merge.j] {
                    merge.i += 1;
                    merge.left[merge.i - 1]
                } else {
                    merge.j += 1;
                    merge.right[merge.j - 1]
                };
                return Some(merge.place(value));
            }

            if merge.i < merge.left.len() {
                let value = merge.left[merge.i];
                merge.i += 1;
                return Some(merge.place(value));
            }
            if merge.j < merge.right.len() {
                let value = merge.right[merge.j];
                merge.j += 1;
                return Some(merge.place(value));
            }

            let range = SortedRange::new(merge.lo, merge.hi);
            self.active = None;
            return Some(Step::MarkSorted { range });
        }
    }
}

fn plan_merges(lo: usize, hi: usize, out: &mut VecDeque<(usize, usize, usize)>) {
    if lo >= hi {
        return;
    }
    let mid = (lo + hi) / 2;
    plan_merges(lo, mid, out);
    plan_merges(mid + 1, hi, out);
    out.push_back((lo, mid, hi));
}

/// Lomuto quick sort, last element as pivot, left partition first.
#[derive(Debug, Clone)]
pub struct QuickCursor {
    stack: Vec<(usize, usize)>,
    active: Option<Partition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartitionStage {
    Compare,
    Decide,
    PlacePivot,
    Mark,
}

#[derive(Debug, Clone)]
struct Partition {
    lo: usize,
    hi: usize,
    pivot: u32,
    /// Next slot for an element smaller than the pivot (boundary + 1).
    store: usize,
    j: usize,
    stage: PartitionStage,
}

impl QuickCursor {
    pub fn new(len: usize) -> Self {
        let stack = if len > 0 { vec![(0, len - 1)] } else { Vec::new() };
        Self {
            stack,
            active: None,
        }
    }

    fn next_step(&mut self, values: &[u32]) -> Option<Step> {
        loop {
            let Some(part) = self.active.as_mut() else {
                let (lo, hi) = self.stack.pop()?;
                if lo == hi {
                    return Some(Step::MarkSorted {
                        range: SortedRange::single(lo),
                    });
                }
                self.active = Some(Partition {
                    lo,
                    hi,
                    pivot: values[hi],
                    store: lo,
                    j: lo,
                    stage: PartitionStage::Compare,
                });
                continue;
            };

            match part.stage {
                PartitionStage::Compare => {
                    if part.j < part.hi {
                        part.stage = PartitionStage::Decide;
                        return Some(Step::Compare {
                            a: part.j,
                            b: part.hi,
                        });
                    }
                    part.stage = PartitionStage::PlacePivot;
                }
                PartitionStage::Decide => {
                    part.stage = PartitionStage::Compare;
                    let j = part.j;
                    part.j += 1;
                    if values[j] < part.pivot {
                        let store = part.store;
                        part.store += 1;
                        return Some(Step::Exchange { a: store, b: j });
                    }
                }
                PartitionStage::PlacePivot => {
                    part.stage = PartitionStage::Mark;
                    return Some(Step::Swap {
                        a: part.store,
                        b: part.hi,
                    });
                }
                PartitionStage::Mark => {
                    let (lo, hi, pivot_index) = (part.lo, part.hi, part.store);
                    self.active = None;
                    // Right is pushed first so the left partition is sorted first.
                    if pivot_index < hi {
                        self.stack.push((pivot_index + 1, hi));
                    }
                    if pivot_index > lo {
                        self.stack.push((lo, pivot_index - 1));
                    }
                    return Some(Step::MarkSorted {
                        range: SortedRange::single(pivot_index),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(steps: &[Step], pred: impl Fn(&Step) -> bool) -> usize {
        steps.iter().filter(|s| pred(s)).count()
    }

    fn compares(steps: &[Step]) -> usize {
        count(steps, |s| matches!(s, Step::Compare { .. }))
    }

    fn marks(steps: &[Step]) -> Vec<SortedRange> {
        steps
            .iter()
            .filter_map(|s| match s {
                Step::MarkSorted { range } => Some(*range),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_bubble_trace() {
        let mut values = vec![5, 3, 8, 1];
        let steps = Algorithm::Bubble.cursor(values.len()).drain(&mut values);

        assert_eq!(values, vec![1, 3, 5, 8]);
        assert_eq!(compares(&steps), 6);
        assert_eq!(count(&steps, |s| matches!(s, Step::Swap { .. })), 4);
        assert_eq!(
            &steps[..5],
            &[
                Step::Compare { a: 0, b: 1 },
                Step::Swap { a: 0, b: 1 },
                Step::Compare { a: 1, b: 2 },
                Step::Compare { a: 2, b: 3 },
                Step::Swap { a: 2, b: 3 },
            ]
        );
        assert_eq!(
            marks(&steps),
            vec![
                SortedRange::single(3),
                SortedRange::single(2),
                SortedRange::single(1),
                SortedRange::single(0),
            ]
        );
    }

    #[test]
    fn test_merge_trace() {
        let mut values = vec![9, 1, 5, 3];
        let steps = Algorithm::Merge.cursor(values.len()).drain(&mut values);

        assert_eq!(values, vec![1, 3, 5, 9]);
        assert_eq!(compares(&steps), 5);
        assert_eq!(
            marks(&steps),
            vec![
                SortedRange::new(0, 1),
                SortedRange::new(2, 3),
                SortedRange::new(0, 3),
            ]
        );

        // Final merge: 1 vs 3, 9 vs 3, 9 vs 5, then drain 9
        let final_merge: Vec<Step> = steps
            .iter()
            .copied()
            .skip_while(|s| *s != Step::MarkSorted { range: SortedRange::new(2, 3) })
            .skip(1)
            .collect();
        assert_eq!(
            final_merge,
            vec![
                Step::Compare { a: 0, b: 2 },
                Step::Place { index: 0, value: 1 },
                Step::Compare { a: 1, b: 2 },
                Step::Place { index: 1, value: 3 },
                Step::Compare { a: 1, b: 3 },
                Step::Place { index: 2, value: 5 },
                Step::Place { index: 3, value: 9 },
                Step::MarkSorted { range: SortedRange::new(0, 3) },
            ]
        );
    }

    #[test]
    fn test_merge_ties_favour_left() {
        let mut cursor = MergeCursor::new(2);
        let values = [4, 4];
        assert_eq!(cursor.next_step(&values), Some(Step::Compare { a: 0, b: 1 }));
        assert_eq!(cursor.next_step(&values), Some(Step::Place { index: 0, value: 4 }));
        // Left run exhausted first, right is drained without a comparison
        assert_eq!(cursor.next_step(&values), Some(Step::Place { index: 1, value: 4 }));
    }

    #[test]
    fn test_quick_trace() {
        let mut values = vec![2, 8, 1, 9];
        let steps = Algorithm::Quick.cursor(values.len()).drain(&mut values);

        assert_eq!(values, vec![1, 2, 8, 9]);
        assert_eq!(compares(&steps), 6);
        assert_eq!(
            marks(&steps),
            vec![
                SortedRange::single(3),
                SortedRange::single(0),
                SortedRange::single(1),
                SortedRange::single(2),
            ]
        );
        // Every compare is against the pivot at the end of the current range
        assert_eq!(steps[0], Step::Compare { a: 0, b: 3 });
        // All of 2, 8, 1 are below 9: each exchanges in place, then the pivot swaps with itself
        assert_eq!(
            &steps[..7],
            &[
                Step::Compare { a: 0, b: 3 },
                Step::Exchange { a: 0, b: 0 },
                Step::Compare { a: 1, b: 3 },
                Step::Exchange { a: 1, b: 1 },
                Step::Compare { a: 2, b: 3 },
                Step::Exchange { a: 2, b: 2 },
                Step::Swap { a: 3, b: 3 },
            ]
        );
        assert_eq!(count(&steps, |s| matches!(s, Step::Exchange { .. })), 3);
        assert_eq!(count(&steps, |s| matches!(s, Step::Swap { .. })), 3);
    }

    #[test]
    fn test_quick_scan_steps_pace_once() {
        let mut values = vec![5, 3, 8, 1];
        let steps = Algorithm::Quick.cursor(values.len()).drain(&mut values);

        assert_eq!(values, vec![1, 3, 5, 8]);
        let paced = count(&steps, |s| s.is_visible());
        // Five scan compares plus two pivot placements
        assert_eq!(paced, 7);
        assert!(!Step::Exchange { a: 1, b: 1 }.is_visible());
    }

    #[test]
    fn test_quick_singleton_marked_without_compares() {
        let mut values = vec![42];
        let steps = Algorithm::Quick.cursor(1).drain(&mut values);
        assert_eq!(
            steps,
            vec![Step::MarkSorted {
                range: SortedRange::single(0)
            }]
        );
    }

    #[test]
    fn test_empty_and_single_inputs() {
        for algorithm in Algorithm::ALL {
            let mut empty: Vec<u32> = Vec::new();
            assert!(algorithm.cursor(0).drain(&mut empty).is_empty());

            let mut single = vec![7];
            let steps = algorithm.cursor(1).drain(&mut single);
            assert_eq!(compares(&steps), 0, "{} on one element", algorithm);
            assert_eq!(marks(&steps), vec![SortedRange::single(0)]);
        }
    }

    #[test]
    fn test_every_algorithm_sorts_and_permutes() {
        let inputs: Vec<Vec<u32>> = vec![
            vec![1, 2, 3, 4, 5, 6, 7, 8],
            vec![8, 7, 6, 5, 4, 3, 2, 1],
            vec![31, 4, 15, 92, 65, 35, 89, 79, 3, 23, 84, 62, 64, 33, 83, 27],
            (1..=32).rev().map(|v| v * 3).collect(),
            vec![50, 10],
        ];
        for algorithm in Algorithm::ALL {
            for input in &inputs {
                let mut values = input.clone();
                algorithm.cursor(values.len()).drain(&mut values);

                let mut expected = input.clone();
                expected.sort_unstable();
                assert_eq!(values, expected, "{} on {:?}", algorithm, input);
            }
        }
    }

    #[test]
    fn test_every_index_is_eventually_marked() {
        for algorithm in Algorithm::ALL {
            let mut values: Vec<u32> = vec![12, 3, 44, 7, 1, 90, 23, 5, 61];
            let steps = algorithm.cursor(values.len()).drain(&mut values);
            let ranges = marks(&steps);
            for index in 0..values.len() {
                assert!(
                    ranges.iter().any(|r| r.contains(index)),
                    "{} never marked index {}",
                    algorithm,
                    index
                );
            }
        }
    }

    #[test]
    fn test_bubble_compare_count_is_triangular() {
        let mut values: Vec<u32> = (1..=16).collect();
        let steps = Algorithm::Bubble.cursor(16).drain(&mut values);
        assert_eq!(compares(&steps), 16 * 15 / 2);
        assert_eq!(count(&steps, |s| matches!(s, Step::Swap { .. })), 0);
    }

    #[test]
    fn test_step_apply() {
        let mut values = vec![1, 2, 3];
        assert!(Step::Swap { a: 0, b: 2 }.apply(&mut values));
        assert_eq!(values, vec![3, 2, 1]);
        assert!(!Step::Place { index: 1, value: 2 }.apply(&mut values));
        assert!(Step::Place { index: 1, value: 9 }.apply(&mut values));
        assert!(!Step::Compare { a: 0, b: 1 }.apply(&mut values));
        assert_eq!(values, vec![3, 9, 1]);
        assert!(Step::Exchange { a: 0, b: 2 }.apply(&mut values));
        assert!(!Step::Exchange { a: 1, b: 1 }.apply(&mut values));
        assert_eq!(values, vec![1, 9, 3]);
    }
}
