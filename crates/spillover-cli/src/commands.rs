//! Subcommand implementations.
//!
//! Each command takes the effective configuration, does its work, logs
//! what it wrote, and returns text for the caller to print.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::info;

use spillover_data::{SampleFiles, read_delimited, write_sample};
use spillover_estimate::{MonteCarloConfig, MonteCarloSummary, run_study};
use spillover_sim::{KnnGrid, SampleGenerator, SampleParams};
use spillover_tables::{
    DescriptiveSpec, DescriptiveTable, DisplayFormat, RegressionSpec, RegressionTable, Table,
    render_csv, render_text, summary_table,
};

use crate::cli::TableArgs;
use crate::config::SpilloverConfig;
use crate::error::CliError;

/// Generate one sample and write it to the output directory.
pub fn simulate(config: &SpilloverConfig) -> Result<SampleFiles, CliError> {
    let sim = &config.simulation;
    let params = SampleParams::new(sim.n)
        .with_k(sim.k)
        .with_seed(sim.seed)
        .with_coefficients(sim.coefficients);
    let sample = SampleGenerator::knn().generate(sim.design, &params)?;
    info!(
        run_id = %sample.meta().run_id,
        fixed_point_residual = sample.fixed_point_residual()?,
        max_row_sum = sample.weights().max_row_sum(),
        "sample diagnostics"
    );

    let files = write_sample(&sample, &config.output.dir)?;
    info!(
        data = %files.data.display(),
        meta = %files.meta.display(),
        "sample written"
    );
    Ok(files)
}

/// Run a Monte Carlo study and write its JSON summary.
///
/// Returns the summary and the path it was written to.
pub fn monte_carlo(config: &SpilloverConfig) -> Result<(MonteCarloSummary, PathBuf), CliError> {
    let sim = &config.simulation;
    let mc = &config.monte_carlo;
    let study = MonteCarloConfig {
        design: sim.design,
        n: sim.n,
        k: sim.k,
        coefficients: sim.coefficients,
        replications: mc.replications,
        base_seed: mc.base_seed,
        noise_sd: mc.noise_sd,
    };
    let summary = run_study(&KnnGrid, &study)?;

    let dir = &config.output.dir;
    std::fs::create_dir_all(dir).map_err(|source| CliError::Io {
        path: dir.clone(),
        source,
    })?;
    let path = dir.join(format!("montecarlo_{}_{}.json", sim.design, sim.n));
    write_file(&path, &serde_json::to_string_pretty(&summary)?)?;
    info!(study_id = %summary.study_id, path = %path.display(), "summary written");
    Ok((summary, path))
}

/// Render a Monte Carlo summary for the terminal.
pub fn render_summary(summary: &MonteCarloSummary, format: &DisplayFormat) -> String {
    render_text(&summary_table(summary), format)
}

/// Assemble a regression table from a data file and a YAML table spec.
pub fn regress(args: &TableArgs, format: &DisplayFormat) -> Result<String, CliError> {
    let spec: RegressionSpec = read_spec(&args.spec)?;
    let frame = read_delimited(&args.data, args.delimiter)?;
    let assembled = RegressionTable::assemble(&frame, &spec)?;
    finish(&assembled.table, args.output.as_deref(), format)
}

/// Assemble a descriptive table from a data file and a YAML table spec.
pub fn describe(args: &TableArgs, format: &DisplayFormat) -> Result<String, CliError> {
    let spec: DescriptiveSpec = read_spec(&args.spec)?;
    let frame = read_delimited(&args.data, args.delimiter)?;
    let table = DescriptiveTable::from_frame(&frame, &spec)?.to_table();
    finish(&table, args.output.as_deref(), format)
}

fn finish(table: &Table, output: Option<&Path>, format: &DisplayFormat) -> Result<String, CliError> {
    if let Some(path) = output {
        write_file(path, &render_csv(table, format))?;
        info!(path = %path.display(), rows = table.n_rows(), "table written");
    }
    Ok(render_text(table, format))
}

fn read_spec<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::TableSpec {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_yml::from_str(&contents).map_err(|e| CliError::TableSpec {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
