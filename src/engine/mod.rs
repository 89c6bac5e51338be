//! Stepwise sort execution.
//!
//! - [`algorithm`]: the supported sort variants
//! - [`step`]: per-algorithm cursors producing observable steps
//! - [`runner`]: the async driver that paces, counts and reports steps
//! - [`events`]: renderer notifications and run reports

pub mod algorithm;
pub mod events;
pub mod runner;
pub mod step;

pub use algorithm::Algorithm;
pub use events::{RunReport, Slot, SortEvent};
pub use runner::{EngineState, Lane, SortEngine};
pub use step::{SortedRange, Step, StepCursor, TerminalMarks};
