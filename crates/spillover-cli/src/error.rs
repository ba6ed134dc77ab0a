//! Error types for the `spillover` binary.
//!
//! Every library error surfaces here unchanged through `#[from]`; `main`
//! reports it and exits non-zero.

use std::path::PathBuf;

use spillover_data::DataError;
use spillover_estimate::EstimateError;
use spillover_sim::SimError;
use spillover_tables::TableError;

use crate::config::ConfigError;

/// Errors that can occur while running a subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Sample generation failed.
    #[error("simulation error: {0}")]
    Sim(#[from] SimError),

    /// Reading or writing data failed.
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// Estimation failed.
    #[error("estimation error: {0}")]
    Estimate(#[from] EstimateError),

    /// Table assembly failed.
    #[error("table error: {0}")]
    Table(#[from] TableError),

    /// A table spec file could not be read or parsed.
    #[error("invalid table spec {path}: {message}")]
    TableSpec {
        /// The table spec file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Writing an output file failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Serializing a summary failed.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
