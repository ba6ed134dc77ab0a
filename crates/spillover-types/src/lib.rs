//! Shared type definitions for the spatial spillover simulations.
//!
//! This crate holds the value types that flow between the generators,
//! the estimation layer, the table renderers and the command-line binary.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for generated runs
//! - [`enums`] -- The three data-generating designs
//! - [`structs`] -- Model coefficients, per-unit records and sample metadata

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Design, ParseDesignError};
pub use ids::{RunId, StudyId};
pub use structs::{Coefficients, Outcomes, SampleMeta, SampleRecord};
