//! Error types for the `spillover-tables` crate.

use spillover_data::DataError;
use spillover_estimate::EstimateError;

/// Errors from assembling a table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Fitting one of the table's regressions failed.
    #[error("estimation failed: {source}")]
    Estimate {
        /// The underlying estimation error.
        #[from]
        source: EstimateError,
    },

    /// A frame operation failed.
    #[error("data error: {source}")]
    Data {
        /// The underlying data error.
        #[from]
        source: DataError,
    },

    /// A specification names no regressors.
    #[error("specification '{0}' has no regressors")]
    EmptySpecification(String),
}
