//! Side-by-side regression tables.
//!
//! Each named specification is fitted as
//! `outcome ~ r1 + r2 + ... + C(fixed_effect) - 1` with cluster-robust
//! covariance and contributes three columns under its name: the estimate
//! (headed by the outcome label), `Std.err` and `P-Value`. Rows are the
//! union of regressors; a regressor a specification leaves out is a
//! missing cell.

use serde::{Deserialize, Serialize};
use tracing::info;

use spillover_data::Frame;
use spillover_estimate::{Covariance, RegressionResult, Specification, fit};

use crate::descriptive::{RowFilter, apply_filters};
use crate::error::TableError;
use crate::table::{Cell, Table};

/// Header of the standard-error column.
pub const STD_ERR: &str = "Std.err";

/// Header of the p-value column.
pub const P_VALUE: &str = "P-Value";

/// A column block of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedSpecification {
    /// Column-group label, e.g. `(1)`.
    pub name: String,
    /// Regressors of this specification.
    pub regressors: Vec<String>,
}

/// Everything a regression table needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionSpec {
    /// Dependent variable.
    pub outcome: String,
    /// Header of the estimate columns; the outcome name if absent.
    #[serde(default)]
    pub outcome_label: Option<String>,
    /// Categorical column absorbed as dummies, replacing the intercept.
    #[serde(default)]
    pub fixed_effect: Option<String>,
    /// Cluster column; classical covariance if absent.
    #[serde(default)]
    pub cluster: Option<String>,
    /// Sample restrictions applied before fitting.
    #[serde(default)]
    pub filters: Vec<RowFilter>,
    /// Row order. Regressors used by a specification but not listed here
    /// are appended in first-use order.
    #[serde(default)]
    pub regressors: Vec<String>,
    /// The specifications, left to right.
    pub specifications: Vec<NamedSpecification>,
}

impl RegressionSpec {
    fn label(&self) -> &str {
        self.outcome_label.as_deref().unwrap_or(&self.outcome)
    }

    fn row_labels(&self) -> Vec<String> {
        let mut rows = self.regressors.clone();
        for r in self.specifications.iter().flat_map(|s| &s.regressors) {
            if !rows.contains(r) {
                rows.push(r.clone());
            }
        }
        rows
    }

    fn covariance(&self) -> Covariance {
        self.cluster
            .as_ref()
            .map_or(Covariance::Classical, |c| Covariance::Cluster(c.clone()))
    }
}

/// An assembled regression table with the fits behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTable {
    /// The rendered-ready table.
    pub table: Table,
    /// One fit per specification, in order.
    pub results: Vec<RegressionResult>,
}

impl RegressionTable {
    /// Fit every specification of `spec` on `frame` and lay out the results.
    pub fn assemble(frame: &Frame, spec: &RegressionSpec) -> Result<Self, TableError> {
        let data = apply_filters(frame, &spec.filters)?;
        let rows = spec.row_labels();
        let covariance = spec.covariance();
        let mut table = Table::new("regressors", rows.clone());
        let mut results = Vec::with_capacity(spec.specifications.len());

        for named in &spec.specifications {
            if named.regressors.is_empty() {
                return Err(TableError::EmptySpecification(named.name.clone()));
            }
            let model = Specification {
                outcome: spec.outcome.clone(),
                regressors: named.regressors.clone(),
                fixed_effect: spec.fixed_effect.clone(),
                intercept: spec.fixed_effect.is_none(),
            };
            let result = fit(&data, &model, &covariance)?;
            info!(
                specification = %named.name,
                formula = %result.formula,
                nobs = result.nobs,
                "specification fitted"
            );

            let mut estimates = Vec::with_capacity(rows.len());
            let mut errors = Vec::with_capacity(rows.len());
            let mut p_values = Vec::with_capacity(rows.len());
            for row in &rows {
                if named.regressors.contains(row) {
                    let c = result.coefficient(row)?;
                    estimates.push(Cell::Number(c.estimate));
                    errors.push(Cell::Number(c.std_error));
                    p_values.push(Cell::Number(c.p_value));
                } else {
                    estimates.push(Cell::Missing);
                    errors.push(Cell::Missing);
                    p_values.push(Cell::Missing);
                }
            }
            let group = Some(named.name.as_str());
            table.push_column(group, spec.label(), estimates);
            table.push_column(group, STD_ERR, errors);
            table.push_column(group, P_VALUE, p_values);
            results.push(result);
        }

        Ok(Self { table, results })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use spillover_data::Column;

    use super::*;
    use crate::format::DisplayFormat;
    use crate::table::render_text;

    fn panel() -> Frame {
        Frame::new()
            .with_column(
                "a",
                Column::Numeric((1..=12).map(f64::from).collect()),
            )
            .unwrap()
            .with_column(
                "b",
                Column::Numeric(vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0, 5.0, 8.0]),
            )
            .unwrap()
            .with_column(
                "y",
                Column::Numeric(vec![
                    2.1, 3.9, 6.2, 7.8, 10.1, 12.2, 13.8, 16.1, 18.0, 19.9, 22.2, 24.1,
                ]),
            )
            .unwrap()
            .with_column(
                "cy",
                Column::Text(["x", "x", "x", "x", "x", "x", "z", "z", "z", "z", "z", "z"]
                    .map(String::from)
                    .to_vec()),
            )
            .unwrap()
            .with_column(
                "id",
                Column::Numeric(vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0, 4.0, 4.0]),
            )
            .unwrap()
    }

    fn spec() -> RegressionSpec {
        serde_yml::from_str(
            r"
outcome: y
outcome_label: Growth
fixed_effect: cy
cluster: id
regressors: [a]
specifications:
  - { name: '(1)', regressors: [a] }
  - { name: '(2)', regressors: [a, b] }
",
        )
        .unwrap()
    }

    #[test]
    fn columns_follow_specifications() {
        let assembled = RegressionTable::assemble(&panel(), &spec()).unwrap();
        let table = &assembled.table;
        assert_eq!(table.row_labels, vec!["a", "b"]);
        assert_eq!(table.columns.len(), 6);
        let labels: Vec<&str> = table.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Growth", STD_ERR, P_VALUE, "Growth", STD_ERR, P_VALUE]);
        assert_eq!(table.columns[3].group.as_deref(), Some("(2)"));
    }

    #[test]
    fn cells_match_direct_fit() {
        let assembled = RegressionTable::assemble(&panel(), &spec()).unwrap();
        let direct = fit(
            &panel(),
            &Specification::new("y", &["a", "b"]).with_fixed_effect("cy"),
            &Covariance::Cluster("id".into()),
        )
        .unwrap();
        let b = direct.coefficient("b").unwrap();
        let table = &assembled.table;
        assert_eq!(
            table.cell(Some("(2)"), "Growth", "b").unwrap().as_number(),
            Some(b.estimate)
        );
        assert_eq!(
            table.cell(Some("(2)"), STD_ERR, "b").unwrap().as_number(),
            Some(b.std_error)
        );
        assert_eq!(table.cell(Some("(1)"), P_VALUE, "b"), Some(&Cell::Missing));
        assert_eq!(assembled.results[1].n_clusters, Some(4));
        assert!(!assembled.results[0].names.iter().any(|n| n == "Intercept"));
    }

    #[test]
    fn filters_restrict_the_sample() {
        let mut spec = spec();
        spec.cluster = None;
        spec.filters = vec![RowFilter {
            column: "a".into(),
            threshold: 2.0,
        }];
        let assembled = RegressionTable::assemble(&panel(), &spec).unwrap();
        assert_eq!(assembled.results[0].nobs, 10);
    }

    #[test]
    fn empty_specification_is_rejected() {
        let mut spec = spec();
        spec.specifications.push(NamedSpecification {
            name: "(3)".into(),
            regressors: Vec::new(),
        });
        assert!(matches!(
            RegressionTable::assemble(&panel(), &spec),
            Err(TableError::EmptySpecification(name)) if name == "(3)"
        ));
    }

    #[test]
    fn renders_two_level_header() {
        let assembled = RegressionTable::assemble(&panel(), &spec()).unwrap();
        let text = render_text(&assembled.table, &DisplayFormat::default());
        let mut lines = text.lines();
        let groups = lines.next().unwrap();
        assert!(groups.contains("(1)") && groups.contains("(2)"));
        assert!(lines.next().unwrap().starts_with("regressors"));
    }
}
