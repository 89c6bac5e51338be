//! Configuration view and validation commands — `sortviz config`.

use anyhow::Result;
use sortviz::config::{VisualizerConfig, VisualizerToml};
use sortviz::ui::format_duration;
use std::path::Path;

use super::super::ConfigCommands;

fn print_toml(toml: &VisualizerToml) {
    println!("[defaults]");
    println!("  size = {}", toml.defaults.size);
    println!("  algorithm = \"{}\"", toml.defaults.algorithm);
    println!("  ui = \"{}\"", toml.defaults.ui);
    if let Some(seed) = toml.defaults.seed {
        println!("  seed = {}", seed);
    }
    println!();
    println!("[speed]");
    println!("  delay_ms = {}", toml.speed.delay_ms);
    println!("  min_delay_ms = {}", toml.speed.min_delay_ms);
    println!("  max_delay_ms = {}", toml.speed.max_delay_ms);
    println!("  control_max = {}", toml.speed.control_max);
    println!();
    println!("[race]");
    println!("  first = \"{}\"", toml.race.first);
    println!("  second = \"{}\"", toml.race.second);
    println!();
}

pub fn cmd_config(
    config_path: &Path,
    config: &VisualizerConfig,
    command: Option<ConfigCommands>,
) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("sortviz Configuration");
            println!("=====================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
                println!();
                print_toml(&VisualizerToml::load(config_path)?);
            } else {
                println!("No sortviz.toml found at {}", config_path.display());
                println!();
                println!("Using default configuration:");
                print_toml(&VisualizerToml::default());
                println!("Run 'sortviz config init' to create a sortviz.toml file.");
                println!();
            }

            println!("Effective values (with env/CLI overrides):");
            println!("  size = {}", config.size);
            println!("  algorithm = \"{}\"", config.algorithm);
            println!("  ui = \"{}\"", config.ui);
            match config.seed {
                Some(seed) => println!("  seed = {}", seed),
                None => println!("  seed = (random)"),
            }
            println!("  delay = {}", format_duration(config.delay));
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No sortviz.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = VisualizerToml::load(config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("sortviz.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if let Some(parent) = config_path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                std::fs::create_dir_all(parent)?;
            }

            VisualizerToml::default().save(config_path)?;

            println!("Created sortviz.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [defaults] size, algorithm, ui, seed");
            println!("  - [speed] delay_ms and the speed control range");
            println!("  - [race] first, second");
            println!();
        }
    }

    Ok(())
}
