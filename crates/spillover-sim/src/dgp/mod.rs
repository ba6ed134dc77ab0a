//! Spillover data-generating processes.
//!
//! Three designs share one pipeline:
//!
//! ```text
//! validate N -> draw D, X -> build W -> (backdoor: reassign D) -> WD = W·D
//!            -> SLX outcomes -> (SDM, backdoor: 10 rounds of WY = W·Y)
//! ```
//!
//! Each design validates `N` against its own list of supported sizes; see
//! [`supported_sizes`].
//!
//! # Modules
//!
//! - [`slx`] -- Exogenous spillover of treatment only.
//! - [`sdm`] -- Outcome spillover resolved by fixed-point rounds.
//! - [`backdoor`] -- Treatment assigned from the neighbours' treatment.

pub mod backdoor;
pub mod sdm;
pub mod slx;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use spillover_types::{Coefficients, Design, Outcomes, RunId, SampleMeta, SampleRecord};

use crate::draws::treatment_as_f64;
use crate::error::SimError;
use crate::grid::Grid;
use crate::weights::{KnnGrid, WeightBuilder, WeightMatrix};

/// Default number of neighbours per unit.
pub const DEFAULT_NEIGHBOURS: usize = 10;

/// Fixed-point rounds applied by the designs with an outcome lag.
pub const FIXED_POINT_ROUNDS: usize = 10;

/// Backdoor reassignment: treated iff the normalized treatment lag exceeds this.
pub const ASSIGNMENT_THRESHOLD: f64 = 0.5;

/// Sizes accepted by each design.
///
/// SLX and SDM accept the 10×10 and 100×100 grids, the backdoor design the
/// 10×10 and 50×50 grids.
pub const fn supported_sizes(design: Design) -> &'static [usize] {
    match design {
        Design::Slx => &slx::SUPPORTED_SIZES,
        Design::Sdm => &sdm::SUPPORTED_SIZES,
        Design::Backdoor => &backdoor::SUPPORTED_SIZES,
    }
}

/// Reject `n` unless the design supports it.
///
/// # Errors
///
/// Returns [`SimError::InvalidSampleSize`] naming the supported sizes.
pub fn validate_size(design: Design, n: usize) -> Result<(), SimError> {
    let supported = supported_sizes(design);
    if supported.contains(&n) {
        return Ok(());
    }
    let listed: Vec<String> = supported.iter().map(ToString::to_string).collect();
    Err(SimError::InvalidSampleSize {
        n,
        supported: format!("{} for the {design} design", listed.join(", ")),
    })
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Inputs shared by every generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleParams {
    /// Number of units.
    pub n: usize,
    /// Neighbours per unit.
    pub k: usize,
    /// Outcome coefficients.
    pub coefficients: Coefficients,
    /// Seed for the treatment and covariate draws.
    pub seed: u64,
}

impl SampleParams {
    /// Parameters for `n` units with the default `k`, coefficients and seed zero.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            k: DEFAULT_NEIGHBOURS,
            coefficients: Coefficients::default(),
            seed: 0,
        }
    }

    /// Replace the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replace the neighbour count.
    #[must_use]
    pub const fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Replace the coefficients.
    #[must_use]
    pub const fn with_coefficients(mut self, coefficients: Coefficients) -> Self {
        self.coefficients = coefficients;
        self
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Generates samples for any design with weights from an injected builder.
#[derive(Debug, Clone, Default)]
pub struct SampleGenerator<B = KnnGrid> {
    builder: B,
}

impl SampleGenerator<KnnGrid> {
    /// Generator using fresh k-nearest-neighbour grid weights.
    pub const fn knn() -> Self {
        Self { builder: KnnGrid }
    }
}

impl<B: WeightBuilder> SampleGenerator<B> {
    /// Generator using the given weight builder.
    pub const fn new(builder: B) -> Self {
        Self { builder }
    }

    /// The weight builder in use.
    pub const fn builder(&self) -> &B {
        &self.builder
    }

    /// Generate one sample under `design`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidSampleSize`] if `params.n` is not supported
    /// by the design, or any error from the weight builder.
    pub fn generate(&self, design: Design, params: &SampleParams) -> Result<SpatialSample, SimError> {
        let sample = match design {
            Design::Slx => slx::simulate(&self.builder, params),
            Design::Sdm => sdm::simulate(&self.builder, params),
            Design::Backdoor => backdoor::simulate(&self.builder, params),
        }?;
        info!(
            run_id = %sample.meta.run_id,
            design = %design,
            n = params.n,
            k = params.k,
            seed = params.seed,
            treated_share = sample.treated_share(),
            "sample generated"
        );
        Ok(sample)
    }
}

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

/// Outcome-lag state carried into [`SpatialSample::assemble`].
pub(crate) struct OutcomeLag {
    /// Final `WY` per unit.
    pub wy: Vec<f64>,
    /// Outcomes before the fixed-point rounds.
    pub no_spill: Vec<Outcomes>,
}

/// A fully generated sample: per-unit records plus the weight matrix.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialSample {
    meta: SampleMeta,
    records: Vec<SampleRecord>,
    weights: WeightMatrix,
}

impl SpatialSample {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        design: Design,
        params: &SampleParams,
        weights: WeightMatrix,
        d: Vec<u8>,
        x: &[f64],
        wd: &[f64],
        outcomes: Vec<Outcomes>,
        lag: Option<OutcomeLag>,
        wd_assignment: Option<Vec<f64>>,
    ) -> Result<Self, SimError> {
        let grid = Grid::square(params.n)?;
        for len in [d.len(), x.len(), wd.len(), outcomes.len()] {
            if len != params.n {
                return Err(SimError::LengthMismatch {
                    expected: params.n,
                    actual: len,
                });
            }
        }

        let records = d
            .into_iter()
            .zip(x)
            .zip(wd)
            .zip(outcomes)
            .enumerate()
            .map(|(unit, (((d, &x), &wd), outcomes))| {
                let point = grid.position(unit);
                SampleRecord {
                    unit,
                    row: point.row,
                    col: point.col,
                    d,
                    x,
                    wd,
                    wy: lag.as_ref().and_then(|l| l.wy.get(unit).copied()),
                    outcomes,
                    no_spill: lag.as_ref().and_then(|l| l.no_spill.get(unit).copied()),
                    wd_assignment: wd_assignment.as_ref().and_then(|a| a.get(unit).copied()),
                }
            })
            .collect();

        let meta = SampleMeta {
            run_id: RunId::new(),
            design,
            n: params.n,
            k: params.k,
            seed: params.seed,
            coefficients: params.coefficients,
            iterations: if design.has_outcome_lag() {
                FIXED_POINT_ROUNDS
            } else {
                0
            },
            generated_at: Utc::now(),
        };

        Ok(Self {
            meta,
            records,
            weights,
        })
    }

    /// Provenance of this sample.
    pub const fn meta(&self) -> &SampleMeta {
        &self.meta
    }

    /// The design that generated this sample.
    pub const fn design(&self) -> Design {
        self.meta.design
    }

    /// Per-unit records in flat-index order.
    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    /// The (binary) weight matrix used for every lag in this sample.
    pub const fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the sample has no units.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Observed outcomes `Y`.
    pub fn y(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.outcomes.y).collect()
    }

    /// Treatments as floats.
    pub fn d(&self) -> Vec<f64> {
        let d: Vec<u8> = self.records.iter().map(|r| r.d).collect();
        treatment_as_f64(&d)
    }

    /// Covariates `X`.
    pub fn x(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.x).collect()
    }

    /// Treatment lags `WD`.
    pub fn wd(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.wd).collect()
    }

    /// Share of treated units.
    pub fn treated_share(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let treated = self.records.iter().filter(|r| r.d == 1).count();
        treated as f64 / self.records.len() as f64
    }

    /// Largest change one more fixed-point round would make to `Y`.
    ///
    /// For SLX the outcome equation has no lag and the residual is zero.
    pub fn fixed_point_residual(&self) -> Result<f64, SimError> {
        let coefficients = &self.meta.coefficients;
        if !self.meta.design.has_outcome_lag() {
            return Ok(self
                .records
                .iter()
                .map(|r| (r.outcomes.y - coefficients.exogenous(r.x, r.wd, r.d).y).abs())
                .fold(0.0, f64::max));
        }
        let wy = self.weights.lag(&self.y())?;
        Ok(self
            .records
            .iter()
            .zip(wy)
            .map(|(r, wy)| (r.outcomes.y - coefficients.endogenous(r.x, r.wd, r.d, wy).y).abs())
            .fold(0.0, f64::max))
    }
}

/// SLX outcomes for every unit.
pub(crate) fn exogenous_outcomes(
    coefficients: &Coefficients,
    d: &[u8],
    x: &[f64],
    wd: &[f64],
) -> Vec<Outcomes> {
    d.iter()
        .zip(x)
        .zip(wd)
        .map(|((&d, &x), &wd)| coefficients.exogenous(x, wd, d))
        .collect()
}
