//! Rendered table model.
//!
//! A [`Table`] is an index column of row labels plus value columns. Each
//! value column may belong to a group; consecutive columns sharing a group
//! form the upper level of a two-line header:
//!
//! ```text
//!               (1)                        (2)
//! regressors    Urbanization rate  Std.err  Urbanization rate  Std.err
//! moisture                   0.31     0.10               0.28     0.09
//! ```

use crate::format::DisplayFormat;

/// Gap between rendered text columns.
const GAP: &str = "  ";

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A number, formatted by the [`DisplayFormat`].
    Number(f64),
    /// Literal text.
    Text(String),
    /// No value; rendered as the format's missing marker.
    Missing,
}

impl Cell {
    fn render(&self, format: &DisplayFormat) -> String {
        match self {
            Self::Number(v) => format.format_value(*v),
            Self::Text(s) => s.clone(),
            Self::Missing => format.missing.clone(),
        }
    }

    /// The number in this cell, if any.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) | Self::Missing => None,
        }
    }
}

/// A value column.
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    /// Upper header level, shared by neighbouring columns.
    pub group: Option<String>,
    /// Lower header level.
    pub label: String,
    /// One cell per row.
    pub cells: Vec<Cell>,
}

/// A table ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Optional line printed above the text rendering.
    pub title: Option<String>,
    /// Header of the index column.
    pub index_name: String,
    /// Row labels.
    pub row_labels: Vec<String>,
    /// Value columns, left to right.
    pub columns: Vec<TableColumn>,
}

impl Table {
    /// Empty table with the given index.
    pub fn new(index_name: &str, row_labels: Vec<String>) -> Self {
        Self {
            title: None,
            index_name: index_name.to_owned(),
            row_labels,
            columns: Vec::new(),
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a column, padding or truncating its cells to the row count.
    pub fn push_column(&mut self, group: Option<&str>, label: &str, mut cells: Vec<Cell>) {
        cells.resize(self.row_labels.len(), Cell::Missing);
        self.columns.push(TableColumn {
            group: group.map(ToOwned::to_owned),
            label: label.to_owned(),
            cells,
        });
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    /// The cell at `row` in the column with this group and label.
    pub fn cell(&self, group: Option<&str>, label: &str, row: &str) -> Option<&Cell> {
        let r = self.row_labels.iter().position(|l| l == row)?;
        self.columns
            .iter()
            .find(|c| c.group.as_deref() == group && c.label == label)
            .and_then(|c| c.cells.get(r))
    }

    fn has_groups(&self) -> bool {
        self.columns.iter().any(|c| c.group.is_some())
    }

    /// Group label to print above column `i`: only at the start of a run.
    fn group_header(&self, i: usize) -> &str {
        let Some(column) = self.columns.get(i) else {
            return "";
        };
        let previous = i
            .checked_sub(1)
            .and_then(|p| self.columns.get(p))
            .map(|c| c.group.as_deref());
        match column.group.as_deref() {
            Some(g) if previous != Some(Some(g)) => g,
            _ => "",
        }
    }
}

/// Render as aligned plain text.
///
/// The index column is left-aligned and value columns right-aligned. A
/// group label spans its run of columns and widens the first one if needed.
pub fn render_text(table: &Table, format: &DisplayFormat) -> String {
    let body: Vec<Vec<String>> = table
        .columns
        .iter()
        .map(|c| c.cells.iter().map(|cell| cell.render(format)).collect())
        .collect();

    let index_width = table
        .row_labels
        .iter()
        .map(|label| display_width(label))
        .chain(std::iter::once(display_width(&table.index_name)))
        .max()
        .unwrap_or(0);
    let widths: Vec<usize> = table
        .columns
        .iter()
        .zip(&body)
        .enumerate()
        .map(|(i, (column, cells))| {
            cells
                .iter()
                .map(|cell| display_width(cell))
                .chain([display_width(&column.label), display_width(table.group_header(i))])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines: Vec<String> = Vec::new();
    if let Some(title) = &table.title {
        lines.push(title.clone());
    }
    if table.has_groups() {
        let mut line = " ".repeat(index_width);
        for (i, width) in widths.iter().enumerate() {
            line.push_str(GAP);
            line.push_str(&format!("{:<width$}", table.group_header(i)));
        }
        lines.push(line.trim_end().to_owned());
    }

    let mut header = format!("{:<index_width$}", table.index_name);
    for (column, width) in table.columns.iter().zip(&widths) {
        header.push_str(GAP);
        header.push_str(&format!("{:>width$}", column.label));
    }
    lines.push(header.trim_end().to_owned());

    for (r, label) in table.row_labels.iter().enumerate() {
        let mut line = format!("{label:<index_width$}");
        for (cells, width) in body.iter().zip(&widths) {
            let text = cells.get(r).map_or("", String::as_str);
            line.push_str(GAP);
            line.push_str(&format!("{text:>width$}"));
        }
        lines.push(line.trim_end().to_owned());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Width in characters, matching how `format!` pads.
fn display_width(text: &str) -> usize {
    text.chars().count()
}

/// Render as comma-separated values.
///
/// Grouped tables get two header rows: groups, then labels. Fields holding
/// a comma, quote or newline are quoted.
pub fn render_csv(table: &Table, format: &DisplayFormat) -> String {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(table.n_rows().saturating_add(2));
    if table.has_groups() {
        let mut groups = vec![String::new()];
        groups.extend(
            table
                .columns
                .iter()
                .map(|c| c.group.clone().unwrap_or_default()),
        );
        rows.push(groups);
    }
    let mut header = vec![table.index_name.clone()];
    header.extend(table.columns.iter().map(|c| c.label.clone()));
    rows.push(header);

    for (r, label) in table.row_labels.iter().enumerate() {
        let mut row = vec![label.clone()];
        row.extend(table.columns.iter().map(|c| {
            c.cells
                .get(r)
                .map_or_else(|| format.missing.clone(), |cell| cell.render(format))
        }));
        rows.push(row);
    }

    let mut out = String::new();
    for row in rows {
        let fields: Vec<String> = row.iter().map(|f| quote(f)).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn grouped() -> Table {
        let mut t = Table::new("regressors", vec!["a".into(), "long_name".into()]);
        t.push_column(Some("(1)"), "coef", vec![Cell::Number(1.5), Cell::Missing]);
        t.push_column(Some("(1)"), "se", vec![Cell::Number(0.25), Cell::Missing]);
        t.push_column(Some("(2)"), "coef", vec![Cell::Number(1234.5), Cell::Number(-2.0)]);
        t
    }

    #[test]
    fn text_has_two_header_lines_and_aligned_rows() {
        let text = render_text(&grouped(), &DisplayFormat::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("(1)"));
        assert!(lines[0].contains("(2)"));
        assert_eq!(lines[0].matches("(1)").count(), 1);
        assert!(lines[1].starts_with("regressors"));
        assert!(lines[2].starts_with("a "));
        assert!(lines[2].ends_with("1,234.50"));
        assert!(lines[3].ends_with("-2.00"));
        assert_eq!(lines[2].len(), lines[3].len());
    }

    #[test]
    fn ungrouped_text_has_single_header_and_title() {
        let mut t = Table::new("row", vec!["x".into()]).with_title("Summary");
        t.push_column(None, "value", vec![Cell::Number(3.0)]);
        let text = render_text(&t, &DisplayFormat::default());
        assert_eq!(text, "Summary\nrow  value\nx     3.00\n");
    }

    #[test]
    fn non_ascii_labels_stay_aligned() {
        let mut t = Table::new("row", vec!["β_X".into(), "x".into()]);
        t.push_column(Some("(1)"), "coef", vec![Cell::Number(1.0), Cell::Number(2.0)]);
        let text = render_text(&t, &DisplayFormat::default());
        assert_eq!(text, "     (1)\nrow  coef\nβ_X  1.00\nx    2.00\n");
    }

    #[test]
    fn csv_quotes_separated_numbers() {
        let csv = render_csv(&grouped(), &DisplayFormat::default());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], ",(1),(1),(2)");
        assert_eq!(lines[1], "regressors,coef,se,coef");
        assert_eq!(lines[2], "a,1.50,0.25,\"1,234.50\"");
        assert_eq!(lines[3], "long_name,,,-2.00");
    }

    #[test]
    fn short_columns_are_padded_with_missing() {
        let mut t = Table::new("row", vec!["x".into(), "y".into()]);
        t.push_column(None, "v", vec![Cell::Number(1.0)]);
        assert_eq!(t.cell(None, "v", "y"), Some(&Cell::Missing));
        assert_eq!(t.cell(None, "v", "x").unwrap().as_number(), Some(1.0));
    }
}
