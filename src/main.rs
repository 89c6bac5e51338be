use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sortviz::config::{CONFIG_FILE_NAME, VisualizerConfig};
use sortviz::engine::Algorithm;
use sortviz::scheduler::DelayPreset;
use sortviz::ui::UiMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "sortviz")]
#[command(version, about = "Step-by-step sorting algorithm visualiser")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to sortviz.toml (defaults to ./sortviz.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output mode: full, minimal or json
    #[arg(long, global = true)]
    pub ui: Option<UiMode>,

    /// Seed for reproducible sequences
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Default)]
pub struct SpeedArgs {
    /// Step delay in milliseconds
    #[arg(long, conflicts_with = "speed")]
    pub delay_ms: Option<u64>,

    /// Speed preset: slow, normal, fast or instant
    #[arg(long)]
    pub speed: Option<DelayPreset>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sort one generated sequence with one algorithm
    Run {
        /// bubble, merge or quick
        #[arg(short, long)]
        algorithm: Option<Algorithm>,

        /// Number of bars (at most 99)
        #[arg(short, long)]
        size: Option<usize>,

        #[command(flatten)]
        speed: SpeedArgs,

        /// Enable +/- speed keys (full UI only); press q to quit after the run
        #[arg(long)]
        keys: bool,
    },
    /// Race two different algorithms on copies of one sequence
    Race {
        /// Algorithm for visualiser 1
        #[arg(long)]
        first: Option<Algorithm>,

        /// Algorithm for visualiser 2
        #[arg(long)]
        second: Option<Algorithm>,

        /// Number of bars (at most 99)
        #[arg(short, long)]
        size: Option<usize>,

        #[command(flatten)]
        speed: SpeedArgs,

        /// Choose both algorithms interactively
        #[arg(long, conflicts_with_all = ["first", "second"])]
        pick: bool,

        /// Enable +/- speed keys (full UI only); press q to quit after the run
        #[arg(long)]
        keys: bool,
    },
    /// List the available algorithms
    Algorithms,
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration file
    Validate,
    /// Create a default sortviz.toml
    Init,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sortviz=debug" } else { "sortviz=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    // Init must work even when the existing file is broken or absent.
    if let Commands::Config {
        command: Some(ConfigCommands::Init),
    } = &cli.command
    {
        return cmd::cmd_config(
            &config_path,
            &VisualizerConfig::default(),
            Some(ConfigCommands::Init),
        );
    }

    let config = VisualizerConfig::load(Some(&config_path))?
        .with_verbose(cli.verbose)
        .with_ui(cli.ui)
        .with_seed(cli.seed);

    match &cli.command {
        Commands::Run {
            algorithm,
            size,
            speed,
            keys,
        } => {
            let config = config
                .with_algorithm(*algorithm)
                .with_size(*size)
                .with_delay(speed.delay_ms, speed.speed);
            cmd::cmd_run(config, *keys).await?;
        }
        Commands::Race {
            first,
            second,
            size,
            speed,
            pick,
            keys,
        } => {
            let config = config
                .with_size(*size)
                .with_delay(speed.delay_ms, speed.speed);
            let args = cmd::RaceArgs {
                first: *first,
                second: *second,
                pick: *pick,
                keys: *keys,
            };
            cmd::cmd_race(config, args).await?;
        }
        Commands::Algorithms => cmd::cmd_algorithms(),
        Commands::Config { command } => cmd::cmd_config(&config_path, &config, command.clone())?,
    }

    Ok(())
}
