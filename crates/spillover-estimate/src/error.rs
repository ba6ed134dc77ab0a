//! Error types for the `spillover-estimate` crate.

/// Errors that can occur while fitting a regression or running a study.
#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    /// `X'X` could not be inverted (collinear regressors or too few levels).
    #[error("design matrix is singular for '{formula}'")]
    Singular {
        /// The formula being fitted.
        formula: String,
    },

    /// Not enough complete rows to estimate every parameter.
    #[error("{observations} complete observations cannot identify {parameters} parameters")]
    TooFewObservations {
        /// Complete rows available.
        observations: usize,
        /// Columns in the design matrix.
        parameters: usize,
    },

    /// Cluster-robust covariance needs at least two clusters.
    #[error("cluster-robust covariance needs at least 2 clusters, found {0}")]
    TooFewClusters(usize),

    /// A coefficient name was requested that the model does not have.
    #[error("no coefficient named '{0}'")]
    UnknownCoefficient(String),

    /// The Student-t reference distribution could not be built.
    #[error("invalid t distribution: {0}")]
    Distribution(String),

    /// A study was configured with no replications.
    #[error("a study needs at least one replication")]
    NoReplications,

    /// Reading columns from the frame failed.
    #[error("data error: {source}")]
    Data {
        /// The underlying data error.
        #[from]
        source: spillover_data::DataError,
    },

    /// Generating a sample failed.
    #[error("simulation error: {source}")]
    Sim {
        /// The underlying simulation error.
        #[from]
        source: spillover_sim::SimError,
    },
}
