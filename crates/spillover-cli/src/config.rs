//! Configuration for the `spillover` binary.
//!
//! Settings live in `spillover.yaml`. Every section and field is optional
//! and falls back to the defaults below. Environment variables override
//! the file:
//!
//! - `SPILLOVER_SEED` -- `simulation.seed` and `monte_carlo.base_seed`
//! - `SPILLOVER_OUTPUT_DIR` -- `output.dir`
//!
//! Command-line flags override both.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use spillover_sim::DEFAULT_NEIGHBOURS;
use spillover_tables::DisplayFormat;
use spillover_types::{Coefficients, Design};

/// File loaded when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "spillover.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// An environment override holds an unusable value.
    #[error("invalid {name}={value}: {message}")]
    Env {
        /// Variable name.
        name: &'static str,
        /// Value found.
        value: String,
        /// Why it was rejected.
        message: String,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpilloverConfig {
    /// Single-sample generation.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Monte Carlo studies.
    #[serde(default)]
    pub monte_carlo: MonteCarloSection,

    /// Where files are written.
    #[serde(default)]
    pub output: OutputConfig,

    /// Number formatting for printed and exported tables.
    #[serde(default)]
    pub display: DisplayFormat,
}

impl SpilloverConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Load the effective configuration: the given file, else
    /// [`DEFAULT_CONFIG_FILE`] if present, else defaults; then apply the
    /// process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if default_path.exists() => Self::from_file(default_path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `SPILLOVER_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("SPILLOVER_SEED") {
            let seed: u64 = value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Env {
                    name: "SPILLOVER_SEED",
                    value: value.clone(),
                    message: e.to_string(),
                }
            })?;
            self.simulation.seed = seed;
            self.monte_carlo.base_seed = seed;
        }
        if let Some(value) = lookup("SPILLOVER_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(value);
        }
        Ok(())
    }
}

/// Single-sample generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Data-generating design.
    #[serde(default = "default_design")]
    pub design: Design,

    /// Number of units.
    #[serde(default = "default_n")]
    pub n: usize,

    /// Neighbours per unit.
    #[serde(default = "default_k")]
    pub k: usize,

    /// Seed for the treatment and covariate draws.
    #[serde(default)]
    pub seed: u64,

    /// Outcome coefficients.
    #[serde(default)]
    pub coefficients: Coefficients,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            design: default_design(),
            n: default_n(),
            k: default_k(),
            seed: 0,
            coefficients: Coefficients::default(),
        }
    }
}

/// Monte Carlo settings; design, size and coefficients come from
/// [`SimulationConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSection {
    /// Number of samples per study.
    #[serde(default = "default_replications")]
    pub replications: usize,

    /// Seed of the first replication.
    #[serde(default)]
    pub base_seed: u64,

    /// Standard deviation of the outcome noise.
    #[serde(default = "default_noise_sd")]
    pub noise_sd: f64,
}

impl Default for MonteCarloSection {
    fn default() -> Self {
        Self {
            replications: default_replications(),
            base_seed: 0,
            noise_sd: default_noise_sd(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for samples and summaries.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_design() -> Design {
    Design::Slx
}

const fn default_n() -> usize {
    100
}

const fn default_k() -> usize {
    DEFAULT_NEIGHBOURS
}

const fn default_replications() -> usize {
    100
}

const fn default_noise_sd() -> f64 {
    1.0
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
