//! A small column-oriented data frame.
//!
//! A [`Frame`] is an ordered list of named columns of equal length. Columns
//! are either numeric (`f64`, with `NaN` for missing cells) or text. The
//! operations cover what the study's tables need: row filters on numeric
//! thresholds, column selection, lexicographic sorting and renaming.

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// The values of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    /// Numeric values; `NaN` marks a missing cell.
    Numeric(Vec<f64>),
    /// Text values; the empty string marks a missing cell.
    Text(Vec<String>),
}

impl Column {
    /// Number of values.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    /// Whether the column has no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric values, if this is a numeric column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Self::Numeric(v) => Some(v),
            Self::Text(_) => None,
        }
    }

    /// Text values, if this is a text column.
    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            Self::Numeric(_) => None,
            Self::Text(v) => Some(v),
        }
    }

    /// Value at `row` rendered as a grouping key.
    ///
    /// Numeric values use their shortest round-trip form, so `3.0` and
    /// `3` from different files map to the same key.
    pub fn key(&self, row: usize) -> Option<String> {
        match self {
            Self::Numeric(v) => v.get(row).map(|x| x.to_string()),
            Self::Text(v) => v.get(row).cloned(),
        }
    }

    /// Whether the cell at `row` is missing.
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Self::Numeric(v) => v.get(row).is_none_or(|x| x.is_nan()),
            Self::Text(v) => v.get(row).is_none_or(String::is_empty),
        }
    }

    /// New column holding the given rows, in the given order.
    fn take(&self, rows: &[usize]) -> Self {
        match self {
            Self::Numeric(v) => Self::Numeric(
                rows.iter()
                    .map(|&r| v.get(r).copied().unwrap_or(f64::NAN))
                    .collect(),
            ),
            Self::Text(v) => Self::Text(
                rows.iter()
                    .map(|&r| v.get(r).cloned().unwrap_or_default())
                    .collect(),
            ),
        }
    }

    /// Compare two rows of this column; `NaN` and empty text sort last.
    fn compare_rows(&self, a: usize, b: usize) -> Ordering {
        match self {
            Self::Numeric(v) => {
                let x = v.get(a).copied().unwrap_or(f64::NAN);
                let y = v.get(b).copied().unwrap_or(f64::NAN);
                match (x.is_nan(), y.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => x.total_cmp(&y),
                }
            }
            Self::Text(v) => {
                let x = v.get(a).map_or("", String::as_str);
                let y = v.get(b).map_or("", String::as_str);
                match (x.is_empty(), y.is_empty()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => x.cmp(y),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Ordered named columns of equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    /// Create an empty frame.
    pub const fn new() -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            n_rows: 0,
        }
    }

    /// Append a column.
    ///
    /// The first column fixes the number of rows.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::LengthMismatch`] if the column length differs
    /// from the frame's row count, or [`DataError::DuplicateColumn`] if the
    /// name is taken.
    pub fn push_column(&mut self, name: &str, column: Column) -> Result<(), DataError> {
        if self.names.iter().any(|n| n == name) {
            return Err(DataError::DuplicateColumn(name.to_owned()));
        }
        if self.columns.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(DataError::LengthMismatch {
                column: name.to_owned(),
                expected: self.n_rows,
                actual: column.len(),
            });
        }
        self.names.push(name.to_owned());
        self.columns.push(column);
        Ok(())
    }

    /// Builder form of [`Self::push_column`].
    pub fn with_column(mut self, name: &str, column: Column) -> Result<Self, DataError> {
        self.push_column(name, column)?;
        Ok(self)
    }

    /// Number of rows.
    pub const fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Iterate over `(name, column)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(&self.columns)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column, DataError> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.columns.get(i))
            .ok_or_else(|| DataError::MissingColumn(name.to_owned()))
    }

    /// Look up a numeric column by name.
    pub fn numeric(&self, name: &str) -> Result<&[f64], DataError> {
        self.column(name)?
            .as_numeric()
            .ok_or_else(|| DataError::NotNumeric(name.to_owned()))
    }

    /// Look up a text column by name.
    pub fn text(&self, name: &str) -> Result<&[String], DataError> {
        self.column(name)?
            .as_text()
            .ok_or_else(|| DataError::NotText(name.to_owned()))
    }

    /// Grouping keys of a column (numeric or text), one per row.
    pub fn keys(&self, name: &str) -> Result<Vec<String>, DataError> {
        let column = self.column(name)?;
        Ok((0..self.n_rows)
            .map(|row| column.key(row).unwrap_or_default())
            .collect())
    }

    /// New frame with the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            n_rows: rows.len(),
        }
    }

    /// Keep the rows for which `keep(row_index)` is true.
    pub fn filter<F>(&self, keep: F) -> Self
    where
        F: Fn(usize) -> bool,
    {
        let rows: Vec<usize> = (0..self.n_rows).filter(|&r| keep(r)).collect();
        self.take_rows(&rows)
    }

    /// Keep rows where numeric `column` is strictly greater than `threshold`.
    ///
    /// Missing (`NaN`) cells never pass.
    pub fn query_gt(&self, column: &str, threshold: f64) -> Result<Self, DataError> {
        let values = self.numeric(column)?;
        Ok(self.filter(|row| values.get(row).is_some_and(|v| *v > threshold)))
    }

    /// New frame with only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Self, DataError> {
        let mut out = Self::new();
        for name in names {
            out.push_column(name, self.column(name)?.clone())?;
        }
        if names.is_empty() {
            out.n_rows = self.n_rows;
        }
        Ok(out)
    }

    /// Sort rows ascending by the named columns, lexicographically.
    ///
    /// Stable; missing values sort last.
    pub fn sort_by(&self, names: &[&str]) -> Result<Self, DataError> {
        let keys: Vec<&Column> = names
            .iter()
            .map(|n| self.column(n))
            .collect::<Result<_, _>>()?;
        let mut rows: Vec<usize> = (0..self.n_rows).collect();
        rows.sort_by(|&a, &b| {
            keys.iter()
                .map(|c| c.compare_rows(a, b))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        Ok(self.take_rows(&rows))
    }

    /// Rename a column.
    pub fn rename(mut self, from: &str, to: &str) -> Result<Self, DataError> {
        if from != to && self.names.iter().any(|n| n == to) {
            return Err(DataError::DuplicateColumn(to.to_owned()));
        }
        let slot = self
            .names
            .iter_mut()
            .find(|n| n.as_str() == from)
            .ok_or_else(|| DataError::MissingColumn(from.to_owned()))?;
        to.clone_into(slot);
        Ok(self)
    }

    /// Indices of rows with no missing cell in any of the named columns.
    pub fn complete_rows(&self, names: &[&str]) -> Result<Vec<usize>, DataError> {
        let columns: Vec<&Column> = names
            .iter()
            .map(|n| self.column(n))
            .collect::<Result<_, _>>()?;
        Ok((0..self.n_rows)
            .filter(|&row| columns.iter().all(|c| !c.is_missing(row)))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn sample_frame() -> Frame {
        Frame::new()
            .with_column("pctile", Column::Numeric(vec![8.0, 3.0, 9.0, f64::NAN, 7.0]))
            .unwrap()
            .with_column("growth", Column::Numeric(vec![0.2, 0.5, -0.1, 0.4, 0.2]))
            .unwrap()
            .with_column(
                "country",
                Column::Text(vec![
                    "KEN".into(),
                    "GHA".into(),
                    "ETH".into(),
                    "NGA".into(),
                    "ETH".into(),
                ]),
            )
            .unwrap()
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let result = Frame::new()
            .with_column("a", Column::Numeric(vec![1.0, 2.0]))
            .unwrap()
            .with_column("b", Column::Numeric(vec![1.0]));
        assert!(matches!(result, Err(DataError::LengthMismatch { .. })));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = sample_frame().with_column("growth", Column::Numeric(vec![0.0; 5]));
        assert!(matches!(result, Err(DataError::DuplicateColumn(_))));
    }

    #[test]
    fn query_gt_drops_missing_and_low_values() {
        let filtered = sample_frame().query_gt("pctile", 6.0).unwrap();
        assert_eq!(filtered.n_rows(), 3);
        assert_eq!(filtered.numeric("pctile").unwrap(), &[8.0, 9.0, 7.0]);
    }

    #[test]
    fn query_on_text_column_fails() {
        assert!(matches!(
            sample_frame().query_gt("country", 1.0),
            Err(DataError::NotNumeric(_))
        ));
    }

    #[test]
    fn select_reorders_columns() {
        let selected = sample_frame().select(&["country", "growth"]).unwrap();
        assert_eq!(selected.column_names(), &["country", "growth"]);
        assert_eq!(selected.n_rows(), 5);
    }

    #[test]
    fn sort_is_lexicographic_and_stable() {
        let sorted = sample_frame().sort_by(&["growth", "country"]).unwrap();
        assert_eq!(sorted.numeric("growth").unwrap(), &[-0.1, 0.2, 0.2, 0.4, 0.5]);
        let countries = sorted.column("country").unwrap().as_text().unwrap();
        assert_eq!(countries, &["ETH", "ETH", "KEN", "NGA", "GHA"]);
    }

    #[test]
    fn sort_puts_missing_last() {
        let sorted = sample_frame().sort_by(&["pctile"]).unwrap();
        let values = sorted.numeric("pctile").unwrap();
        assert_eq!(&values[..4], &[3.0, 7.0, 8.0, 9.0]);
        assert!(values[4].is_nan());
    }

    #[test]
    fn rename_changes_only_the_name() {
        let renamed = sample_frame().rename("growth", "Annual growth").unwrap();
        assert_eq!(renamed.numeric("Annual growth").unwrap().len(), 5);
        assert!(renamed.column("growth").is_err());
    }

    #[test]
    fn keys_render_numbers_and_text() {
        let frame = sample_frame();
        assert_eq!(frame.keys("pctile").unwrap()[0], "8");
        assert_eq!(frame.keys("country").unwrap()[1], "GHA");
    }

    #[test]
    fn complete_rows_skip_missing() {
        let rows = sample_frame().complete_rows(&["pctile", "growth"]).unwrap();
        assert_eq!(rows, vec![0, 1, 2, 4]);
    }
}
