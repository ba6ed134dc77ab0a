//! Descriptive variable listings.
//!
//! The pattern is: keep rows where every filter column exceeds its
//! threshold, select the variables, sort by them, then rename for display.

use serde::{Deserialize, Serialize};
use tracing::debug;

use spillover_data::{Column, DataError, Frame};

use crate::error::TableError;
use crate::table::{Cell, Table};

/// Keep rows where `column > threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFilter {
    /// Numeric column to test.
    pub column: String,
    /// Exclusive lower bound.
    pub threshold: f64,
}

/// Display name for a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    /// Column name in the data.
    pub from: String,
    /// Name shown in the table.
    pub to: String,
}

/// What a descriptive table shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveSpec {
    /// Optional heading.
    #[serde(default)]
    pub title: Option<String>,
    /// Row filters, all of which must pass.
    #[serde(default)]
    pub filters: Vec<RowFilter>,
    /// Columns to show, also the sort keys in this order.
    pub variables: Vec<String>,
    /// Renames applied last.
    #[serde(default)]
    pub renames: Vec<Rename>,
}

/// Apply every filter in turn.
pub(crate) fn apply_filters(frame: &Frame, filters: &[RowFilter]) -> Result<Frame, DataError> {
    filters.iter().try_fold(frame.clone(), |acc, f| {
        acc.query_gt(&f.column, f.threshold)
    })
}

/// A filtered, sorted and renamed selection of variables.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveTable {
    title: Option<String>,
    frame: Frame,
}

impl DescriptiveTable {
    /// Build the listing described by `spec` from `frame`.
    pub fn from_frame(frame: &Frame, spec: &DescriptiveSpec) -> Result<Self, TableError> {
        let variables: Vec<&str> = spec.variables.iter().map(String::as_str).collect();
        let mut out = apply_filters(frame, &spec.filters)?
            .select(&variables)?
            .sort_by(&variables)?;
        for rename in &spec.renames {
            out = out.rename(&rename.from, &rename.to)?;
        }
        debug!(
            rows_in = frame.n_rows(),
            rows_out = out.n_rows(),
            "descriptive table assembled"
        );
        Ok(Self {
            title: spec.title.clone(),
            frame: out,
        })
    }

    /// The resulting rows.
    pub const fn frame(&self) -> &Frame {
        &self.frame
    }

    /// As a renderable table, rows labelled by position.
    pub fn to_table(&self) -> Table {
        let labels = (0..self.frame.n_rows()).map(|r| r.to_string()).collect();
        let mut table = Table::new("", labels);
        if let Some(title) = &self.title {
            table = table.with_title(title.clone());
        }
        for (name, column) in self.frame.iter() {
            let cells = match column {
                Column::Numeric(values) => values.iter().map(|v| Cell::Number(*v)).collect(),
                Column::Text(values) => values.iter().map(|v| Cell::Text(v.clone())).collect(),
            };
            table.push_column(None, name, cells);
        }
        table
    }
}
