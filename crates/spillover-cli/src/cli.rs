//! Command-line arguments.
//!
//! Flags override the loaded [`SpilloverConfig`]; anything left unset keeps
//! the configured value.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use spillover_types::Design;

use crate::config::SpilloverConfig;

/// Spatial spillover simulations, Monte Carlo studies and tables.
#[derive(Debug, Parser)]
#[command(name = "spillover")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: `spillover.yaml` if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless `RUST_LOG` says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate one sample and write it as CSV plus JSON metadata
    Simulate(SampleArgs),

    /// Measure estimator bias over repeated samples
    MonteCarlo {
        /// Sample settings
        #[command(flatten)]
        sample: SampleArgs,

        /// Number of samples
        #[arg(short, long)]
        replications: Option<usize>,

        /// Standard deviation of the outcome noise
        #[arg(long)]
        noise_sd: Option<f64>,
    },

    /// Fit side-by-side regressions from a table spec
    Regress(TableArgs),

    /// List filtered, sorted variables from a table spec
    Describe(TableArgs),
}

/// Settings shared by the sampling subcommands.
#[derive(Debug, Clone, Args)]
pub struct SampleArgs {
    /// Data-generating design: slx, sdm or backdoor
    #[arg(short, long)]
    pub design: Option<Design>,

    /// Number of units
    #[arg(short, long)]
    pub n: Option<usize>,

    /// Neighbours per unit
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Seed (the first replication's seed for Monte Carlo)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Output directory
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

/// Inputs of the table subcommands.
#[derive(Debug, Clone, Args)]
pub struct TableArgs {
    /// Delimited data file with a header row
    #[arg(long)]
    pub data: PathBuf,

    /// YAML table spec
    #[arg(long)]
    pub spec: PathBuf,

    /// Field delimiter of the data file
    #[arg(long, default_value = ",")]
    pub delimiter: char,

    /// Also write the table as CSV here
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl SampleArgs {
    fn apply(&self, config: &mut SpilloverConfig, seed_is_base: bool) {
        if let Some(design) = self.design {
            config.simulation.design = design;
        }
        if let Some(n) = self.n {
            config.simulation.n = n;
        }
        if let Some(k) = self.k {
            config.simulation.k = k;
        }
        if let Some(seed) = self.seed {
            if seed_is_base {
                config.monte_carlo.base_seed = seed;
            } else {
                config.simulation.seed = seed;
            }
        }
        if let Some(dir) = &self.out_dir {
            config.output.dir.clone_from(dir);
        }
    }
}

impl Command {
    /// Fold this command's flags into `config`.
    pub fn apply(&self, config: &mut SpilloverConfig) {
        match self {
            Self::Simulate(sample) => sample.apply(config, false),
            Self::MonteCarlo {
                sample,
                replications,
                noise_sd,
            } => {
                sample.apply(config, true);
                if let Some(r) = replications {
                    config.monte_carlo.replications = *r;
                }
                if let Some(sd) = noise_sd {
                    config.monte_carlo.noise_sd = *sd;
                }
            }
            Self::Regress(_) | Self::Describe(_) => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn simulate_flags_override_config() {
        let cli = Cli::try_parse_from([
            "spillover", "simulate", "--design", "backdoor", "-n", "2500", "--seed", "9",
        ])
        .unwrap();
        let mut config = SpilloverConfig::default();
        cli.command.apply(&mut config);
        assert_eq!(config.simulation.design, Design::Backdoor);
        assert_eq!(config.simulation.n, 2500);
        assert_eq!(config.simulation.seed, 9);
        assert_eq!(config.simulation.k, 10);
    }

    #[test]
    fn monte_carlo_seed_sets_base_seed() {
        let cli = Cli::try_parse_from([
            "spillover", "monte-carlo", "--design", "sdm", "-r", "25", "--seed", "3",
        ])
        .unwrap();
        let mut config = SpilloverConfig::default();
        cli.command.apply(&mut config);
        assert_eq!(config.monte_carlo.replications, 25);
        assert_eq!(config.monte_carlo.base_seed, 3);
        assert_eq!(config.simulation.seed, 0);
    }

    #[test]
    fn unknown_design_is_rejected() {
        assert!(Cli::try_parse_from(["spillover", "simulate", "--design", "sar"]).is_err());
    }

    #[test]
    fn table_args_default_to_comma() {
        let cli = Cli::try_parse_from([
            "spillover", "regress", "--data", "panel.csv", "--spec", "table2.yaml",
        ])
        .unwrap();
        let Command::Regress(args) = cli.command else {
            panic!("expected regress");
        };
        assert_eq!(args.delimiter, ',');
        assert!(args.output.is_none());
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["spillover", "simulate", "--config", "alt.yaml", "-v"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.yaml")));
        assert!(cli.verbose);
    }
}
