//! Configuration for sortviz.
//!
//! Settings are read from `sortviz.toml` and layered file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [defaults]
//! size = 16
//! algorithm = "bubble"
//! ui = "full"
//! seed = 42
//!
//! [speed]
//! delay_ms = 100
//! min_delay_ms = 5
//! max_delay_ms = 1000
//! control_max = 100
//!
//! [race]
//! first = "bubble"
//! second = "quick"
//! ```

use crate::engine::Algorithm;
use crate::errors::MAX_SEQUENCE_LEN;
use crate::scheduler::{DelayPreset, SpeedControl};
use crate::sequence::SIZE_PRESETS;
use crate::ui::UiMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "sortviz.toml";

/// Default settings for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Number of bars to generate
    #[serde(default = "default_size")]
    pub size: usize,
    /// Algorithm for single runs
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Output mode
    #[serde(default)]
    pub ui: UiMode,
    /// Seed for reproducible sequences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_size() -> usize {
    16
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            algorithm: Algorithm::default(),
            ui: UiMode::default(),
            seed: None,
        }
    }
}

/// Step delay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedSection {
    /// Initial step delay in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Fastest delay reachable through the speed control
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    /// Slowest delay reachable through the speed control
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Range of the speed control value
    #[serde(default = "default_control_max")]
    pub control_max: u32,
}

fn default_delay_ms() -> u64 {
    DelayPreset::Normal.delay().as_millis() as u64
}

fn default_min_delay_ms() -> u64 {
    5
}

fn default_max_delay_ms() -> u64 {
    1000
}

fn default_control_max() -> u32 {
    100
}

impl Default for SpeedSection {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            control_max: default_control_max(),
        }
    }
}

impl SpeedSection {
    pub fn speed_control(&self) -> SpeedControl {
        SpeedControl::new(
            Duration::from_millis(self.min_delay_ms),
            Duration::from_millis(self.max_delay_ms),
            self.control_max,
        )
    }
}

/// Default selections for a race.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceSection {
    #[serde(default = "default_first")]
    pub first: Algorithm,
    #[serde(default = "default_second")]
    pub second: Algorithm,
}

fn default_first() -> Algorithm {
    Algorithm::Bubble
}

fn default_second() -> Algorithm {
    Algorithm::Quick
}

impl Default for RaceSection {
    fn default() -> Self {
        Self {
            first: default_first(),
            second: default_second(),
        }
    }
}

/// The complete sortviz.toml structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizerToml {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub speed: SpeedSection,
    #[serde(default)]
    pub race: RaceSection,
}

impl VisualizerToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse sortviz.toml")
    }

    /// Load from `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize sortviz.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.defaults.size > MAX_SEQUENCE_LEN {
            warnings.push(format!(
                "size {} exceeds the maximum of {} unique values",
                self.defaults.size, MAX_SEQUENCE_LEN
            ));
        } else if !SIZE_PRESETS.contains(&self.defaults.size) {
            warnings.push(format!(
                "size {} is not one of the presets {:?}",
                self.defaults.size, SIZE_PRESETS
            ));
        }

        let speed = &self.speed;
        if speed.min_delay_ms == 0 {
            warnings.push("min_delay_ms must be at least 1".to_string());
        }
        if speed.min_delay_ms > speed.max_delay_ms {
            warnings.push(format!(
                "min_delay_ms ({}) is greater than max_delay_ms ({})",
                speed.min_delay_ms, speed.max_delay_ms
            ));
        }
        if speed.control_max == 0 {
            warnings.push("control_max must be at least 1".to_string());
        }
        if speed.delay_ms == 0 {
            warnings.push("delay_ms must be at least 1".to_string());
        }

        if self.race.first == self.race.second {
            warnings.push(format!(
                "race selections are identical ({}); races will be rejected",
                self.race.first
            ));
        }

        warnings
    }
}

/// Settings after layering file, environment and CLI arguments.
#[derive(Debug, Clone)]
pub struct VisualizerConfig {
    /// Where the file layer was read from
    pub config_path: PathBuf,
    /// Parsed file layer
    pub toml: VisualizerToml,
    /// CLI override: verbose logging
    pub verbose: bool,
    pub size: usize,
    pub algorithm: Algorithm,
    pub ui: UiMode,
    pub seed: Option<u64>,
    pub delay: Duration,
}

impl VisualizerConfig {
    /// Read the file layer (defaults if missing) and apply the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        let toml = VisualizerToml::load_or_default(&config_path)?;
        let mut config = Self::from_toml(config_path, toml);
        config.apply_env()?;
        Ok(config)
    }

    /// Take every value from the file layer.
    pub fn from_toml(config_path: PathBuf, toml: VisualizerToml) -> Self {
        Self {
            size: toml.defaults.size,
            algorithm: toml.defaults.algorithm,
            ui: toml.defaults.ui,
            seed: toml.defaults.seed,
            delay: Duration::from_millis(toml.speed.delay_ms),
            config_path,
            toml,
            verbose: false,
        }
    }

    /// Apply `SORTVIZ_DELAY_MS`, `SORTVIZ_SEED` and `SORTVIZ_UI`.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("SORTVIZ_DELAY_MS") {
            let ms: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid SORTVIZ_DELAY_MS '{}'", value))?;
            self.delay = Duration::from_millis(ms);
        }
        if let Ok(value) = std::env::var("SORTVIZ_SEED") {
            let seed: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid SORTVIZ_SEED '{}'", value))?;
            self.seed = Some(seed);
        }
        if let Ok(value) = std::env::var("SORTVIZ_UI") {
            self.ui = UiMode::from_name(&value)
                .with_context(|| format!("Invalid SORTVIZ_UI '{}'", value))?;
        }
        Ok(())
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_ui(mut self, ui: Option<UiMode>) -> Self {
        if let Some(ui) = ui {
            self.ui = ui;
        }
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }

    pub fn with_size(mut self, size: Option<usize>) -> Self {
        if let Some(size) = size {
            self.size = size;
        }
        self
    }

    pub fn with_algorithm(mut self, algorithm: Option<Algorithm>) -> Self {
        if let Some(algorithm) = algorithm {
            self.algorithm = algorithm;
        }
        self
    }

    /// Apply an explicit delay in milliseconds, or a preset; the explicit delay wins.
    pub fn with_delay(mut self, delay_ms: Option<u64>, preset: Option<DelayPreset>) -> Self {
        if let Some(ms) = delay_ms {
            self.delay = Duration::from_millis(ms);
        } else if let Some(preset) = preset {
            self.delay = preset.delay();
        }
        self
    }

    pub fn speed_control(&self) -> SpeedControl {
        self.toml.speed.speed_control()
    }

    pub fn race_selections(&self) -> (Algorithm, Algorithm) {
        (self.toml.race.first, self.toml.race.second)
    }

    /// Validate the file layer and return warnings.
    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self::from_toml(PathBuf::from(CONFIG_FILE_NAME), VisualizerToml::default())
    }
}
