//! Tables for the spillover study.
//!
//! Every renderer takes a [`DisplayFormat`] explicitly; nothing here reads
//! process-wide formatting state.
//!
//! # Modules
//!
//! - [`format`] -- Number formatting.
//! - [`table`] -- The rendered table model with text and CSV output.
//! - [`regression`] -- Side-by-side regression tables.
//! - [`descriptive`] -- Filtered, sorted variable listings.
//! - [`montecarlo`] -- Monte Carlo summaries as tables.
//! - [`error`] -- Error types for table assembly.

pub mod descriptive;
pub mod error;
pub mod format;
pub mod montecarlo;
pub mod regression;
pub mod table;

// Re-export primary types at crate root.
pub use descriptive::{DescriptiveSpec, DescriptiveTable, Rename, RowFilter};
pub use error::TableError;
pub use format::DisplayFormat;
pub use montecarlo::summary_table;
pub use regression::{NamedSpecification, RegressionSpec, RegressionTable};
pub use table::{Cell, Table, TableColumn, render_csv, render_text};
