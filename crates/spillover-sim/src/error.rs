//! Error types for the `spillover-sim` crate.
//!
//! Generation is all-or-nothing: every failure is raised before any sample
//! is returned.

/// Errors that can occur while building weights or generating samples.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The number of units does not fit the grid the caller expects.
    #[error("invalid sample size {n}: supported sizes are {supported}")]
    InvalidSampleSize {
        /// The rejected number of units.
        n: usize,
        /// Human-readable description of the accepted sizes.
        supported: String,
    },

    /// The neighbour count cannot be satisfied on this grid.
    #[error("cannot select {k} neighbours for each of {n} units")]
    TooManyNeighbours {
        /// Requested neighbours per unit.
        k: usize,
        /// Number of units.
        n: usize,
    },

    /// A prebuilt weight matrix was offered for a different shape.
    #[error("weight matrix has n={actual_n}, k={actual_k} but n={n}, k={k} was requested")]
    WeightShapeMismatch {
        /// Units requested.
        n: usize,
        /// Neighbours requested.
        k: usize,
        /// Units in the prebuilt matrix.
        actual_n: usize,
        /// Neighbours in the prebuilt matrix.
        actual_k: usize,
    },

    /// A vector passed to a spatial lag has the wrong length.
    #[error("vector of length {actual} does not match {expected} units")]
    LengthMismatch {
        /// Number of units in the weight matrix.
        expected: usize,
        /// Length of the offending vector.
        actual: usize,
    },
}
