//! Monte Carlo summaries as tables.

use spillover_estimate::MonteCarloSummary;

use crate::table::{Cell, Table};

/// One row per estimator: formula, mean estimate, bias, spread, RMSE and
/// interval coverage.
pub fn summary_table(summary: &MonteCarloSummary) -> Table {
    let config = &summary.config;
    let labels = summary.estimators.iter().map(|e| e.name.clone()).collect();
    let mut table = Table::new("estimator", labels).with_title(format!(
        "{} design, N = {}, k = {}, {} replications, true effect {}",
        config.design, config.n, config.k, config.replications, summary.true_effect
    ));

    let e = &summary.estimators;
    table.push_column(None, "formula", e.iter().map(|s| Cell::Text(s.formula.clone())).collect());
    table.push_column(None, "mean", e.iter().map(|s| Cell::Number(s.mean_estimate)).collect());
    table.push_column(None, "bias", e.iter().map(|s| Cell::Number(s.bias)).collect());
    table.push_column(None, "std.dev", e.iter().map(|s| Cell::Number(s.std_dev)).collect());
    table.push_column(None, "rmse", e.iter().map(|s| Cell::Number(s.rmse)).collect());
    table.push_column(None, "coverage", e.iter().map(|s| Cell::Number(s.coverage)).collect());
    table
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use spillover_estimate::{EstimatorSummary, MonteCarloConfig};
    use spillover_types::{Design, StudyId};

    use super::*;
    use crate::format::DisplayFormat;
    use crate::table::render_text;

    #[test]
    fn one_row_per_estimator() {
        let summary = MonteCarloSummary {
            study_id: StudyId::new(),
            config: MonteCarloConfig::new(Design::Slx, 100),
            true_effect: 0.25,
            estimators: vec![EstimatorSummary {
                name: "naive".into(),
                formula: "Y ~ D + X".into(),
                mean_estimate: 0.3,
                bias: 0.05,
                std_dev: 0.1,
                rmse: 0.11,
                coverage: 0.9,
            }],
        };
        let table = summary_table(&summary);
        assert_eq!(table.row_labels, vec!["naive"]);
        let text = render_text(&table, &DisplayFormat::default());
        assert!(text.starts_with("slx design, N = 100"));
        assert!(text.contains("Y ~ D + X"));
        assert!(text.contains("0.90"));
    }
}
