//! Single-lane runs and the algorithm list — `sortviz run`, `sortviz algorithms`.

use anyhow::{Context, Result};
use console::style;
use sortviz::config::VisualizerConfig;
use sortviz::engine::{Algorithm, RunReport, SortEvent};
use sortviz::session::{Mode, Visualizer};
use sortviz::ui::{ChartUI, UiMode};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::keys::SpeedKeys;

/// Capacity of the event channel between the engine and the display task.
pub const EVENT_BUFFER: usize = 256;

/// Spawn the display task; it hands the UI back once every sender is gone.
pub fn spawn_display(
    mut ui: ChartUI,
    mut event_rx: mpsc::Receiver<SortEvent>,
) -> JoinHandle<ChartUI> {
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            ui.handle_event(&event);
        }
        ui
    })
}

/// Generate, start and wait, then drain the display task.
///
/// Returns the reports and the UI so the caller can print a summary.
pub async fn drive(
    config: &VisualizerConfig,
    mode: Mode,
    mut viz: Visualizer,
    ui: ChartUI,
    event_rx: mpsc::Receiver<SortEvent>,
    keys: bool,
) -> Result<(Vec<RunReport>, ChartUI)> {
    let display = spawn_display(ui, event_rx);

    viz.generate(config.size).await?;
    viz.start().await?;

    let speed_keys = if keys && config.ui == UiMode::Full {
        SpeedKeys::spawn(viz.scheduler().clone(), *viz.speed_control())
    } else {
        None
    };

    let reports = viz.wait().await?;
    tracing::debug!(?mode, lanes = reports.len(), "Run complete");

    // Dropping the controller closes the event channel.
    drop(viz);
    let ui = display.await.context("Display task failed")?;
    ui.finish();

    if let Some(speed_keys) = speed_keys {
        println!("{}", style("Run finished. Press q to quit.").dim());
        speed_keys.wait_for_quit().await;
    }
    Ok((reports, ui))
}

pub async fn cmd_run(config: VisualizerConfig, keys: bool) -> Result<()> {
    let (event_tx, event_rx) = mpsc::channel::<SortEvent>(EVENT_BUFFER);
    let viz = Visualizer::new(&config, Mode::Single).with_event_channel(event_tx);

    let ui = ChartUI::new(config.ui, config.verbose);
    ui.print_header(
        &format!("sortviz: {}", config.algorithm.label()),
        config.delay,
    );

    let (reports, _ui) = drive(&config, Mode::Single, viz, ui, event_rx, keys).await?;

    if config.ui == UiMode::Full {
        for report in &reports {
            println!();
            println!(
                "{} finished: {} comparisons, {} swaps in {}",
                style(report.algorithm.label()).bold(),
                style(report.comparisons).cyan(),
                style(report.swaps).cyan(),
                sortviz::ui::format_duration(report.elapsed)
            );
        }
    }
    Ok(())
}

pub fn cmd_algorithms() {
    println!();
    println!("Available algorithms:");
    for algorithm in Algorithm::ALL {
        println!(
            "  {:<8} {}",
            style(algorithm.to_string()).cyan().bold(),
            algorithm.label()
        );
    }
    println!();
}
