//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module   | Commands handled       |
//! |----------|------------------------|
//! | `run`    | `Run`, `Algorithms`    |
//! | `race`   | `Race`                 |
//! | `config` | `Config`               |
//!
//! `keys` is the keyboard speed control shared by `run` and `race`.

pub mod config;
pub mod keys;
pub mod race;
pub mod run;

pub use config::cmd_config;
pub use race::{RaceArgs, cmd_race};
pub use run::{cmd_algorithms, cmd_run};
