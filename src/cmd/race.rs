//! Two algorithms racing on one sequence — `sortviz race`.

use anyhow::Result;
use console::style;
use dialoguer::{Select, theme::ColorfulTheme};
use sortviz::config::VisualizerConfig;
use sortviz::dual::RaceSummary;
use sortviz::engine::{Algorithm, Slot, SortEvent};
use sortviz::session::{Mode, Visualizer};
use sortviz::ui::{ChartUI, UiMode, format_duration};
use tokio::sync::mpsc;

use super::run::{EVENT_BUFFER, drive};

/// Race options after clap parsing.
pub struct RaceArgs {
    pub first: Option<Algorithm>,
    pub second: Option<Algorithm>,
    pub pick: bool,
    pub keys: bool,
}

pub async fn cmd_race(config: VisualizerConfig, args: RaceArgs) -> Result<()> {
    let (event_tx, event_rx) = mpsc::channel::<SortEvent>(EVENT_BUFFER);
    let mut viz = Visualizer::new(&config, Mode::Dual).with_event_channel(event_tx);

    if args.pick {
        pick_algorithms(&mut viz)?;
    } else {
        if let Some(first) = args.first {
            viz.set_algorithm(Slot::One, first)?;
        }
        if let Some(second) = args.second {
            viz.set_algorithm(Slot::Two, second)?;
        }
    }

    let (first, second) = (viz.selection(Slot::One), viz.selection(Slot::Two));
    let ui = ChartUI::new(config.ui, config.verbose);
    ui.print_header(
        &format!("sortviz race: {} vs {}", first.label(), second.label()),
        config.delay,
    );

    let (reports, ui) = drive(&config, Mode::Dual, viz, ui, event_rx, args.keys).await?;

    if let [a, b] = reports.as_slice() {
        if config.ui == UiMode::Full {
            println!();
            for report in [a, b] {
                println!(
                    "  [{}] {:<12} {} comparisons, {} swaps in {}",
                    report.slot,
                    style(report.algorithm.label()).bold(),
                    style(report.comparisons).cyan(),
                    style(report.swaps).cyan(),
                    format_duration(report.elapsed)
                );
            }
        }
        ui.print_race_summary(&reports, &RaceSummary::from_reports(a, b));
    }
    Ok(())
}

/// Prompt for both slots; slot 2's list never offers slot 1's choice.
fn pick_algorithms(viz: &mut Visualizer) -> Result<()> {
    let theme = ColorfulTheme::default();

    let options = viz.algorithm_options(Slot::One)?;
    let labels: Vec<&str> = options.iter().map(|a| a.label()).collect();
    let current = viz.selection(Slot::One);
    let selection = Select::with_theme(&theme)
        .with_prompt("Algorithm for visualiser 1")
        .items(&labels)
        .default(options.iter().position(|a| *a == current).unwrap_or(0))
        .interact()?;
    viz.set_algorithm(Slot::One, options[selection])?;

    // Slot 2 keeps its previous choice when it is still offered.
    let options = viz.algorithm_options(Slot::Two)?;
    let labels: Vec<&str> = options.iter().map(|a| a.label()).collect();
    let current = viz.selection(Slot::Two);
    let selection = Select::with_theme(&theme)
        .with_prompt("Algorithm for visualiser 2")
        .items(&labels)
        .default(options.iter().position(|a| *a == current).unwrap_or(0))
        .interact()?;
    viz.set_algorithm(Slot::Two, options[selection])?;

    Ok(())
}
