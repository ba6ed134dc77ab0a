//! Column-oriented data frames and delimited file I/O.
//!
//! Generated samples are persisted as delimited text for later estimation,
//! and observational panels are read back from the same format.
//!
//! # Modules
//!
//! - [`frame`] -- [`Frame`] and [`Column`] with filter, select, sort and
//!   rename operations.
//! - [`delimited`] -- Reading and writing frames as delimited text.
//! - [`sample`] -- Converting a [`SpatialSample`] into a frame and writing
//!   it with its metadata side-file.
//! - [`error`] -- Error types for frame operations and I/O.
//!
//! [`Frame`]: frame::Frame
//! [`Column`]: frame::Column
//! [`SpatialSample`]: spillover_sim::SpatialSample

pub mod delimited;
pub mod error;
pub mod frame;
pub mod sample;

pub use delimited::{read_delimited, write_delimited};
pub use error::DataError;
pub use frame::{Column, Frame};
pub use sample::{SampleFiles, sample_to_frame, write_sample};
