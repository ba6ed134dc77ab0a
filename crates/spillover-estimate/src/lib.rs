//! Estimation for the spillover study.
//!
//! # Modules
//!
//! - [`ols`] -- Ordinary least squares with optional fixed-effect dummies,
//!   classical or cluster-robust covariance, and Student-t inference.
//! - [`montecarlo`] -- Repeated sampling from a design to measure the bias
//!   of naive and spillover-aware estimators of the direct effect.
//! - [`error`] -- Error types for estimation.

pub mod error;
pub mod montecarlo;
pub mod ols;

pub use error::EstimateError;
pub use montecarlo::{EstimatorSummary, MonteCarloConfig, MonteCarloSummary, run_study};
pub use ols::{Coefficient, Covariance, RegressionResult, Specification, fit};
