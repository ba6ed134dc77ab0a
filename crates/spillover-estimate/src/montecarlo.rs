//! Monte Carlo studies of spillover bias.
//!
//! A study draws many samples from one design, fits a naive regression
//! `Y ~ D + X` and a spillover-aware regression `Y ~ D + X + WD` on each,
//! and summarizes how far the estimated coefficient on `D` lands from the
//! true direct effect `γ`.
//!
//! The generators produce outcomes without an error term, which would make
//! the spillover-aware SLX fit exact. Studies therefore add independent
//! `N(0, noise_sd²)` noise to `Y`, drawn from a separate stream of the
//! replication's seed so the treatment and covariate draws are unchanged.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use spillover_data::{Column, Frame};
use spillover_sim::{
    DEFAULT_NEIGHBOURS, SampleGenerator, SampleParams, SpatialSample, WeightBuilder, validate_size,
};
use spillover_types::{Coefficients, Design, StudyId};

use crate::error::EstimateError;
use crate::ols::{Covariance, Specification, fit};

/// Confidence level used for coverage.
const COVERAGE_LEVEL: f64 = 0.95;

/// Stream id for outcome noise, distinct from the draw stream.
const NOISE_STREAM: u64 = 1;

/// Settings for one study.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Data-generating design.
    pub design: Design,
    /// Units per sample.
    pub n: usize,
    /// Neighbours per unit.
    pub k: usize,
    /// Outcome coefficients.
    pub coefficients: Coefficients,
    /// Number of samples.
    pub replications: usize,
    /// Seed of the first replication; replication `r` uses `base_seed + r`.
    pub base_seed: u64,
    /// Standard deviation of the outcome noise.
    pub noise_sd: f64,
}

impl MonteCarloConfig {
    /// A 100-replication study with default coefficients and unit noise.
    pub fn new(design: Design, n: usize) -> Self {
        Self {
            design,
            n,
            k: DEFAULT_NEIGHBOURS,
            coefficients: Coefficients::default(),
            replications: 100,
            base_seed: 0,
            noise_sd: 1.0,
        }
    }
}

/// Sampling behaviour of one estimator of the direct effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorSummary {
    /// Short estimator label.
    pub name: String,
    /// Formula fitted on every sample.
    pub formula: String,
    /// Mean estimate of the coefficient on `D`.
    pub mean_estimate: f64,
    /// `mean_estimate - γ`.
    pub bias: f64,
    /// Standard deviation of the estimates across replications.
    pub std_dev: f64,
    /// Root mean squared error against `γ`.
    pub rmse: f64,
    /// Share of 95% intervals containing `γ`.
    pub coverage: f64,
}

/// Result of a study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    /// Unique study identifier.
    pub study_id: StudyId,
    /// Settings the study ran with.
    pub config: MonteCarloConfig,
    /// True direct effect `γ`.
    pub true_effect: f64,
    /// One summary per estimator.
    pub estimators: Vec<EstimatorSummary>,
}

/// The estimators every study compares.
fn estimators() -> [(&'static str, Specification); 2] {
    [
        ("naive", Specification::new("Y", &["D", "X"])),
        ("spillover", Specification::new("Y", &["D", "X", "WD"])),
    ]
}

/// Run a study, building the weight matrix once through `builder`.
///
/// # Errors
///
/// Returns [`EstimateError::NoReplications`] for an empty study,
/// [`EstimateError::Distribution`] for a negative or non-finite
/// `noise_sd`, and any generation or fitting error from an individual
/// replication.
pub fn run_study<B: WeightBuilder + ?Sized>(
    builder: &B,
    config: &MonteCarloConfig,
) -> Result<MonteCarloSummary, EstimateError> {
    if config.replications == 0 {
        return Err(EstimateError::NoReplications);
    }
    if !config.noise_sd.is_finite() || config.noise_sd < 0.0 {
        return Err(EstimateError::Distribution(format!(
            "noise_sd must be finite and non-negative, got {}",
            config.noise_sd
        )));
    }
    validate_size(config.design, config.n)?;
    let study_id = StudyId::new();
    let gamma = config.coefficients.gamma;
    info!(
        study_id = %study_id,
        design = %config.design,
        n = config.n,
        k = config.k,
        replications = config.replications,
        "monte carlo study started"
    );

    let generator = SampleGenerator::new(builder.build(config.n, config.k)?);
    let specs = estimators();
    let mut estimates: Vec<Vec<f64>> = vec![Vec::with_capacity(config.replications); specs.len()];
    let mut covered: Vec<usize> = vec![0; specs.len()];

    for r in 0..config.replications {
        let seed = config.base_seed.wrapping_add(r as u64);
        let params = SampleParams::new(config.n)
            .with_k(config.k)
            .with_seed(seed)
            .with_coefficients(config.coefficients);
        let sample = generator.generate(config.design, &params)?;
        let frame = noisy_frame(&sample, seed, config.noise_sd)?;

        for ((_, spec), (est, hits)) in specs
            .iter()
            .zip(estimates.iter_mut().zip(covered.iter_mut()))
        {
            let result = fit(&frame, spec, &Covariance::Classical)?;
            let d = result.coefficient("D")?;
            let (lo, hi) = result.conf_int("D", COVERAGE_LEVEL)?;
            if lo <= gamma && gamma <= hi {
                *hits = hits.saturating_add(1);
            }
            est.push(d.estimate);
        }
        debug!(replication = r, seed, "replication fitted");
    }

    let reps = config.replications as f64;
    let estimators: Vec<EstimatorSummary> = specs
        .iter()
        .zip(estimates.iter().zip(&covered))
        .map(|((name, spec), (est, &hits))| {
            let mean = est.iter().sum::<f64>() / reps;
            let var = if est.len() > 1 {
                est.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / (reps - 1.0)
            } else {
                0.0
            };
            let mse = est.iter().map(|e| (e - gamma).powi(2)).sum::<f64>() / reps;
            EstimatorSummary {
                name: (*name).to_owned(),
                formula: spec.formula(),
                mean_estimate: mean,
                bias: mean - gamma,
                std_dev: var.sqrt(),
                rmse: mse.sqrt(),
                coverage: hits as f64 / reps,
            }
        })
        .collect();

    for e in &estimators {
        info!(
            study_id = %study_id,
            estimator = %e.name,
            bias = e.bias,
            rmse = e.rmse,
            coverage = e.coverage,
            "estimator summarized"
        );
    }

    Ok(MonteCarloSummary {
        study_id,
        config: *config,
        true_effect: gamma,
        estimators,
    })
}

/// Frame with `Y` (plus noise), `D`, `X` and `WD` for one replication.
fn noisy_frame(sample: &SpatialSample, seed: u64, noise_sd: f64) -> Result<Frame, EstimateError> {
    let mut y = sample.y();
    if noise_sd > 0.0 {
        let normal = Normal::new(0.0, noise_sd)
            .map_err(|e| EstimateError::Distribution(e.to_string()))?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(NOISE_STREAM);
        for v in &mut y {
            *v += normal.sample(&mut rng);
        }
    }
    Ok(Frame::new()
        .with_column("Y", Column::Numeric(y))?
        .with_column("D", Column::Numeric(sample.d()))?
        .with_column("X", Column::Numeric(sample.x()))?
        .with_column("WD", Column::Numeric(sample.wd()))?)
}
