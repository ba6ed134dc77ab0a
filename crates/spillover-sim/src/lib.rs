//! Spatial weight construction and spillover data-generating processes.
//!
//! This crate generates the synthetic samples used to illustrate spillover
//! bias: units on a square grid, a k-nearest-neighbour weight matrix, a
//! binary treatment and a normal covariate, and an outcome built under one
//! of three causal structures.
//!
//! # Modules
//!
//! - [`grid`] -- Square grids of units and their coordinates.
//! - [`weights`] -- [`WeightMatrix`] and the [`WeightBuilder`] seam through
//!   which generators obtain their weights.
//! - [`draws`] -- Seeded treatment and covariate draws.
//! - [`dgp`] -- The SLX, SDM and backdoor generators and the
//!   [`SpatialSample`] they produce.
//! - [`error`] -- Error types for grid and sample generation.
//!
//! [`WeightMatrix`]: weights::WeightMatrix
//! [`WeightBuilder`]: weights::WeightBuilder
//! [`SpatialSample`]: dgp::SpatialSample

pub mod dgp;
pub mod draws;
pub mod error;
pub mod grid;
pub mod weights;

// Re-export primary types at crate root.
pub use dgp::{
    ASSIGNMENT_THRESHOLD, DEFAULT_NEIGHBOURS, FIXED_POINT_ROUNDS, SampleGenerator, SampleParams,
    SpatialSample, supported_sizes, validate_size,
};
pub use draws::Draws;
pub use error::SimError;
pub use grid::{Grid, GridPoint};
pub use weights::{KnnGrid, WeightBuilder, WeightMatrix};
