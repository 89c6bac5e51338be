//! Stepwise sort execution engine.
//!
//! Sort algorithms are broken into observable steps (compare, swap, place,
//! mark sorted), paced by a shared [`scheduler::StepScheduler`], counted by
//! [`counters::InstrumentationCounters`] and reported to a renderer as
//! [`engine::SortEvent`]s. Two lanes can race on copies of one sequence through
//! [`dual::DualRunCoordinator`]; [`session::Visualizer`] ties it together.

pub mod config;
pub mod counters;
pub mod dual;
pub mod engine;
pub mod errors;
pub mod scheduler;
pub mod sequence;
pub mod session;
pub mod ui;
