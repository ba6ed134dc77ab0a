//! Command-line entry point for spatial spillover studies.
//!
//! ```text
//! spillover simulate    --design sdm -n 100 --seed 7   -> output/sdm_100.csv + .json
//! spillover monte-carlo --design backdoor -r 200       -> bias table + JSON summary
//! spillover regress     --data panel.csv --spec table2.yaml
//! spillover describe    --data panel.csv --spec table1a.yaml
//! ```
//!
//! Logs go to stderr; tables go to stdout.

mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::SpilloverConfig;

/// Application entry point.
///
/// Initializes logging, loads configuration (file, then environment, then
/// flags), and runs the requested subcommand.
///
/// # Errors
///
/// Returns an error if configuration, generation, estimation or I/O fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize structured logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("spillover starting");

    let mut config = SpilloverConfig::load(cli.config.as_deref())?;
    cli.command.apply(&mut config);
    info!(
        design = %config.simulation.design,
        n = config.simulation.n,
        k = config.simulation.k,
        seed = config.simulation.seed,
        replications = config.monte_carlo.replications,
        output_dir = %config.output.dir.display(),
        "configuration loaded"
    );

    match &cli.command {
        Command::Simulate(_) => {
            let files = commands::simulate(&config)?;
            println!("{}", files.data.display());
            println!("{}", files.meta.display());
        }
        Command::MonteCarlo { .. } => {
            let (summary, path) = commands::monte_carlo(&config)?;
            print!("{}", commands::render_summary(&summary, &config.display));
            println!("{}", path.display());
        }
        Command::Regress(args) => print!("{}", commands::regress(args, &config.display)?),
        Command::Describe(args) => print!("{}", commands::describe(args, &config.display)?),
    }

    info!("spillover finished");
    Ok(())
}
