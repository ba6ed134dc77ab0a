//! Ordinary least squares with fixed effects and clustered covariance.
//!
//! A [`Specification`] mirrors a formula such as
//! `ADurbfrac ~ ADsm0_2moistu + lndiscst + C(countryyear) - 1`: an outcome,
//! numeric regressors, and optionally one categorical column expanded into
//! one dummy per level. Rows with a missing cell in any column the model
//! uses (including the cluster column) are dropped before fitting.
//!
//! # Covariance
//!
//! - [`Covariance::Classical`]: `σ²(X'X)⁻¹` with `σ² = RSS / (n - p)`;
//!   inference on `n - p` degrees of freedom.
//! - [`Covariance::Cluster`]: the CR1 sandwich
//!   `c·(X'X)⁻¹ (Σ_g X_g'u_g u_g'X_g) (X'X)⁻¹` with
//!   `c = G/(G-1) · (n-1)/(n-p)`; inference on `G - 1` degrees of freedom.

use core::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::debug;

use spillover_data::Frame;

use crate::error::EstimateError;

/// Name given to the constant column.
pub const INTERCEPT: &str = "Intercept";

// ---------------------------------------------------------------------------
// Specification
// ---------------------------------------------------------------------------

/// What to regress on what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    /// Dependent variable.
    pub outcome: String,
    /// Numeric regressors, in reporting order.
    pub regressors: Vec<String>,
    /// Categorical column absorbed as one dummy per level.
    #[serde(default)]
    pub fixed_effect: Option<String>,
    /// Whether to include a constant.
    #[serde(default = "default_true")]
    pub intercept: bool,
}

const fn default_true() -> bool {
    true
}

impl Specification {
    /// `outcome ~ regressors` with a constant.
    pub fn new(outcome: &str, regressors: &[&str]) -> Self {
        Self {
            outcome: outcome.to_owned(),
            regressors: regressors.iter().map(|r| (*r).to_owned()).collect(),
            fixed_effect: None,
            intercept: true,
        }
    }

    /// Add a full set of dummies for `column` and drop the constant.
    #[must_use]
    pub fn with_fixed_effect(mut self, column: &str) -> Self {
        self.fixed_effect = Some(column.to_owned());
        self.intercept = false;
        self
    }

    /// Drop the constant.
    #[must_use]
    pub const fn without_intercept(mut self) -> Self {
        self.intercept = false;
        self
    }

    /// The specification in formula notation.
    pub fn formula(&self) -> String {
        let mut terms: Vec<String> = self.regressors.clone();
        if let Some(fe) = &self.fixed_effect {
            terms.push(format!("C({fe})"));
        }
        let mut formula = format!("{} ~ {}", self.outcome, terms.join(" + "));
        if !self.intercept {
            formula.push_str(" - 1");
        }
        formula
    }
}

/// Covariance estimator for the coefficient standard errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Covariance {
    /// Homoskedastic OLS covariance.
    Classical,
    /// Cluster-robust covariance grouped by the named column.
    Cluster(String),
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One estimated coefficient with its inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    /// Regressor name.
    pub name: String,
    /// Point estimate.
    pub estimate: f64,
    /// Standard error.
    pub std_error: f64,
    /// t statistic.
    pub t_value: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// A fitted regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Formula that was fitted.
    pub formula: String,
    /// Column names of the design matrix.
    pub names: Vec<String>,
    /// Coefficient estimates.
    pub params: Vec<f64>,
    /// Standard errors.
    pub bse: Vec<f64>,
    /// t statistics.
    pub t_values: Vec<f64>,
    /// Two-sided p-values.
    pub p_values: Vec<f64>,
    /// Observations used.
    pub nobs: usize,
    /// Residual degrees of freedom, `n - p`.
    pub df_resid: usize,
    /// Degrees of freedom of the t reference distribution.
    pub df_inference: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Number of clusters, for cluster-robust covariance.
    pub n_clusters: Option<usize>,
    /// Covariance estimator used.
    pub covariance: Covariance,
}

impl RegressionResult {
    /// Look up one coefficient by name.
    pub fn coefficient(&self, name: &str) -> Result<Coefficient, EstimateError> {
        let i = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| EstimateError::UnknownCoefficient(name.to_owned()))?;
        let at = |v: &[f64]| v.get(i).copied().unwrap_or(f64::NAN);
        Ok(Coefficient {
            name: name.to_owned(),
            estimate: at(&self.params),
            std_error: at(&self.bse),
            t_value: at(&self.t_values),
            p_value: at(&self.p_values),
        })
    }

    /// Two-sided confidence interval at `level` (e.g. `0.95`).
    pub fn conf_int(&self, name: &str, level: f64) -> Result<(f64, f64), EstimateError> {
        let c = self.coefficient(name)?;
        let dist = t_distribution(self.df_inference)?;
        let q = dist.inverse_cdf(1.0 - (1.0 - level) / 2.0);
        Ok((c.estimate - q * c.std_error, c.estimate + q * c.std_error))
    }
}

// ---------------------------------------------------------------------------
// Fitting
// ---------------------------------------------------------------------------

/// Fit `spec` on `frame` with the chosen covariance estimator.
///
/// # Errors
///
/// Returns [`EstimateError::Data`] for missing or non-numeric columns,
/// [`EstimateError::TooFewObservations`] if `n <= p`,
/// [`EstimateError::Singular`] if `X'X` is not invertible, or
/// [`EstimateError::TooFewClusters`] if clustering on fewer than two groups.
pub fn fit(
    frame: &Frame,
    spec: &Specification,
    covariance: &Covariance,
) -> Result<RegressionResult, EstimateError> {
    let formula = spec.formula();

    let mut used: Vec<&str> = vec![spec.outcome.as_str()];
    used.extend(spec.regressors.iter().map(String::as_str));
    if let Some(fe) = &spec.fixed_effect {
        used.push(fe);
    }
    if let Covariance::Cluster(column) = covariance {
        used.push(column);
    }
    let data = frame.take_rows(&frame.complete_rows(&used)?);
    let n = data.n_rows();

    let (names, columns) = design_columns(&data, spec)?;
    let p = columns.len();
    if p == 0 || n <= p {
        return Err(EstimateError::TooFewObservations {
            observations: n,
            parameters: p,
        });
    }

    let x = DMatrix::from_column_slice(n, p, &columns.concat());
    let y = DVector::from_column_slice(data.numeric(&spec.outcome)?);

    let xtx_inv = (x.transpose() * &x)
        .try_inverse()
        .ok_or_else(|| EstimateError::Singular {
            formula: formula.clone(),
        })?;
    let beta = &xtx_inv * (x.transpose() * &y);
    let resid = &y - &x * &beta;
    let rss = resid.norm_squared();
    let df_resid = n.saturating_sub(p);

    let (cov, df_inference, n_clusters) = match covariance {
        Covariance::Classical => {
            let sigma2 = rss / df_resid as f64;
            (&xtx_inv * sigma2, df_resid as f64, None)
        }
        Covariance::Cluster(column) => {
            let (groups, n_groups) = group_index(&data.keys(column)?);
            if n_groups < 2 {
                return Err(EstimateError::TooFewClusters(n_groups));
            }
            let mut scores = DMatrix::<f64>::zeros(n_groups, p);
            for (i, (&g, &u)) in groups.iter().zip(resid.iter()).enumerate() {
                let contribution = x.row(i) * u;
                let mut row = scores.row_mut(g);
                row += contribution;
            }
            let meat = scores.transpose() * &scores;
            let g = n_groups as f64;
            let correction = g / (g - 1.0) * ((n as f64 - 1.0) / df_resid as f64);
            (
                &xtx_inv * meat * &xtx_inv * correction,
                g - 1.0,
                Some(n_groups),
            )
        }
    };

    let dist = t_distribution(df_inference)?;
    let params: Vec<f64> = beta.iter().copied().collect();
    let bse: Vec<f64> = cov.diagonal().iter().map(|v| v.max(0.0).sqrt()).collect();
    let t_values: Vec<f64> = params.iter().zip(&bse).map(|(b, s)| b / s).collect();
    let p_values = t_values
        .iter()
        .map(|t| {
            if t.is_nan() {
                f64::NAN
            } else {
                2.0 * dist.sf(t.abs())
            }
        })
        .collect();

    let centered = spec.intercept || spec.fixed_effect.is_some();
    let tss = if centered {
        let mean = y.mean();
        y.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
    } else {
        y.norm_squared()
    };
    let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { f64::NAN };

    debug!(formula, nobs = n, parameters = p, r_squared, "regression fitted");

    Ok(RegressionResult {
        formula,
        names,
        params,
        bse,
        t_values,
        p_values,
        nobs: n,
        df_resid,
        df_inference,
        r_squared,
        n_clusters,
        covariance: covariance.clone(),
    })
}

/// Named design-matrix columns: constant, regressors, then fixed-effect dummies.
fn design_columns(
    data: &Frame,
    spec: &Specification,
) -> Result<(Vec<String>, Vec<Vec<f64>>), EstimateError> {
    let n = data.n_rows();
    let mut names = Vec::new();
    let mut columns = Vec::new();

    if spec.intercept {
        names.push(INTERCEPT.to_owned());
        columns.push(vec![1.0; n]);
    }
    for regressor in &spec.regressors {
        names.push(regressor.clone());
        columns.push(data.numeric(regressor)?.to_vec());
    }
    if let Some(fe) = &spec.fixed_effect {
        let keys = data.keys(fe)?;
        // With a constant the first level is the reference category.
        let skip = usize::from(spec.intercept);
        for level in sorted_levels(&keys).into_iter().skip(skip) {
            names.push(if spec.intercept {
                format!("C({fe})[T.{level}]")
            } else {
                format!("C({fe})[{level}]")
            });
            columns.push(
                keys.iter()
                    .map(|k| if *k == level { 1.0 } else { 0.0 })
                    .collect(),
            );
        }
    }
    Ok((names, columns))
}

/// Distinct levels, numerically ordered when every level is a number.
fn sorted_levels(keys: &[String]) -> Vec<String> {
    let mut levels: Vec<String> = keys.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
    let numeric: Option<Vec<f64>> = levels.iter().map(|l| l.parse::<f64>().ok()).collect();
    if numeric.is_some() {
        levels.sort_by(|a, b| {
            let x = a.parse::<f64>().unwrap_or(f64::NAN);
            let y = b.parse::<f64>().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        });
    }
    levels
}

/// Map each row's key to a dense group index.
fn group_index(keys: &[String]) -> (Vec<usize>, usize) {
    let mut ids: BTreeMap<&str, usize> = BTreeMap::new();
    let groups = keys
        .iter()
        .map(|k| {
            let next = ids.len();
            *ids.entry(k.as_str()).or_insert(next)
        })
        .collect();
    (groups, ids.len())
}

fn t_distribution(df: f64) -> Result<StudentsT, EstimateError> {
    StudentsT::new(0.0, 1.0, df).map_err(|e| EstimateError::Distribution(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use spillover_data::Column;

    use super::*;

    fn frame(columns: &[(&str, Column)]) -> Frame {
        let mut frame = Frame::new();
        for (name, column) in columns {
            frame.push_column(name, column.clone()).unwrap();
        }
        frame
    }

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn formula_renders_fixed_effect_without_constant() {
        let spec = Specification::new("ADurbfrac", &["ADsm0_2moistu", "lndiscst"])
            .with_fixed_effect("countryyear");
        assert_eq!(
            spec.formula(),
            "ADurbfrac ~ ADsm0_2moistu + lndiscst + C(countryyear) - 1"
        );
        assert_eq!(Specification::new("Y", &["D"]).formula(), "Y ~ D");
    }

    #[test]
    fn simple_regression_matches_hand_computation() {
        let data = frame(&[
            ("x", Column::Numeric(vec![1.0, 2.0, 3.0, 4.0, 5.0])),
            ("y", Column::Numeric(vec![2.0, 4.0, 5.0, 4.0, 5.0])),
        ]);
        let result = fit(&data, &Specification::new("y", &["x"]), &Covariance::Classical).unwrap();
        let slope = result.coefficient("x").unwrap();
        let constant = result.coefficient(INTERCEPT).unwrap();
        assert!(close(slope.estimate, 0.6, 1e-12));
        assert!(close(constant.estimate, 2.2, 1e-12));
        assert!(close(slope.std_error, 0.08_f64.sqrt(), 1e-12));
        assert!(close(constant.std_error, 0.88_f64.sqrt(), 1e-12));
        assert!(close(slope.p_value, 0.124_027_062_657_554_59, 1e-9));
        assert!(close(result.r_squared, 0.6, 1e-12));
        assert_eq!(result.df_resid, 3);
    }

    #[test]
    fn cluster_covariance_matches_cr1() {
        let data = frame(&[
            ("x", Column::Numeric(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
            ("y", Column::Numeric(vec![1.0, 3.0, 2.0, 5.0, 4.0, 6.0])),
            (
                "g",
                Column::Text(["a", "a", "b", "b", "c", "c"].map(String::from).to_vec()),
            ),
        ]);
        let spec = Specification::new("y", &["x"]);
        let clustered = fit(&data, &spec, &Covariance::Cluster("g".into())).unwrap();
        let classical = fit(&data, &spec, &Covariance::Classical).unwrap();

        assert_eq!(clustered.params, classical.params);
        assert!(close(clustered.bse[0], 0.395_501_919_979_515_06, 1e-9));
        assert!(close(clustered.bse[1], 0.101_307_569_592_847_59, 1e-9));
        assert!(close(classical.bse[0], 0.903_959_543_974_650_1, 1e-9));
        assert!(close(classical.bse[1], 0.232_115_382_989_598_9, 1e-9));
        assert_eq!(clustered.n_clusters, Some(3));
        assert_eq!(clustered.df_inference, 2.0);
        assert!(close(clustered.p_values[1], 0.012_831_411_467_453_702, 1e-9));
    }

    #[test]
    fn fixed_effects_absorb_group_constants() {
        let x = vec![0.0, 1.0, 2.0, 0.5, 1.5, 3.0];
        let group = vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0];
        let y: Vec<f64> = x
            .iter()
            .zip(&group)
            .map(|(x, g)| 2.0 * x + if *g == 1.0 { 10.0 } else { -3.0 })
            .collect();
        let data = frame(&[
            ("x", Column::Numeric(x)),
            ("y", Column::Numeric(y)),
            ("cy", Column::Numeric(group)),
        ]);
        let spec = Specification::new("y", &["x"]).with_fixed_effect("cy");
        let result = fit(&data, &spec, &Covariance::Classical).unwrap();
        assert_eq!(result.names, vec!["x", "C(cy)[1]", "C(cy)[2]"]);
        assert!(close(result.params[0], 2.0, 1e-10));
        assert!(close(result.params[1], 10.0, 1e-10));
        assert!(close(result.params[2], -3.0, 1e-10));
    }

    #[test]
    fn numeric_levels_sort_numerically() {
        let keys: Vec<String> = ["10", "2", "1", "2"].map(String::from).to_vec();
        assert_eq!(sorted_levels(&keys), vec!["1", "2", "10"]);
    }

    #[test]
    fn rows_with_missing_cells_are_dropped() {
        let data = frame(&[
            ("x", Column::Numeric(vec![1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0])),
            ("y", Column::Numeric(vec![1.0, 2.0, 3.0, f64::NAN, 5.0, 6.5])),
        ]);
        let result = fit(&data, &Specification::new("y", &["x"]), &Covariance::Classical).unwrap();
        assert_eq!(result.nobs, 4);
    }

    #[test]
    fn collinear_regressors_are_singular() {
        let data = frame(&[
            ("a", Column::Numeric(vec![1.0, 2.0, 3.0, 4.0])),
            ("b", Column::Numeric(vec![2.0, 4.0, 6.0, 8.0])),
            ("y", Column::Numeric(vec![1.0, 0.0, 1.0, 3.0])),
        ]);
        let result = fit(&data, &Specification::new("y", &["a", "b"]), &Covariance::Classical);
        assert!(matches!(result, Err(EstimateError::Singular { .. })));
    }

    #[test]
    fn too_few_rows_are_rejected() {
        let data = frame(&[
            ("x", Column::Numeric(vec![1.0, 2.0])),
            ("y", Column::Numeric(vec![1.0, 2.0])),
        ]);
        let result = fit(&data, &Specification::new("y", &["x"]), &Covariance::Classical);
        assert!(matches!(
            result,
            Err(EstimateError::TooFewObservations {
                observations: 2,
                parameters: 2
            })
        ));
    }

    #[test]
    fn single_cluster_is_rejected() {
        let data = frame(&[
            ("x", Column::Numeric(vec![1.0, 2.0, 3.0, 4.0])),
            ("y", Column::Numeric(vec![1.0, 3.0, 2.0, 4.0])),
            ("g", Column::Numeric(vec![7.0; 4])),
        ]);
        let result = fit(
            &data,
            &Specification::new("y", &["x"]),
            &Covariance::Cluster("g".into()),
        );
        assert!(matches!(result, Err(EstimateError::TooFewClusters(1))));
    }

    #[test]
    fn unknown_coefficient_is_an_error() {
        let data = frame(&[
            ("x", Column::Numeric(vec![1.0, 2.0, 3.0, 4.0])),
            ("y", Column::Numeric(vec![1.0, 3.0, 2.0, 4.0])),
        ]);
        let result = fit(&data, &Specification::new("y", &["x"]), &Covariance::Classical).unwrap();
        assert!(matches!(
            result.coefficient("z"),
            Err(EstimateError::UnknownCoefficient(_))
        ));
    }

    #[test]
    fn confidence_interval_contains_estimate() {
        let data = frame(&[
            ("x", Column::Numeric(vec![1.0, 2.0, 3.0, 4.0, 5.0])),
            ("y", Column::Numeric(vec![2.0, 4.0, 5.0, 4.0, 5.0])),
        ]);
        let result = fit(&data, &Specification::new("y", &["x"]), &Covariance::Classical).unwrap();
        let (lo, hi) = result.conf_int("x", 0.95).unwrap();
        // t(3) 97.5% quantile is 3.182446.
        assert!(close(hi - 0.6, 3.182_446_305_284_263 * 0.08_f64.sqrt(), 1e-6));
        assert!(lo < 0.6 && 0.6 < hi);
    }
}
