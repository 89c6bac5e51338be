pub mod chart;
pub mod icons;

pub use chart::{ChartUI, UiMode, format_duration};
