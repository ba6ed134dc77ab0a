//! Endogenous-outcome sample (SDM design).
//!
//! Approximates the reduced form of `Y = ρ·W·Y + γ·W·D + γ·D + β·X` by
//! Jacobi rounds starting from the SLX outcome:
//!
//! ```text
//! WY  <- W·Y
//! Y   <- β·X + γ·WD + γ·D + ρ·WY
//! Y1  <- β·X + γ·WD + γ   + ρ·WY
//! Y0  <- β·X + γ·WD       + ρ·WY
//! ```
//!
//! Exactly [`FIXED_POINT_ROUNDS`] rounds are applied whatever `ρ` is.
//! Convergence holds when `|ρ|·max_row_sum(W) < 1` but is not checked.

use tracing::debug;

use spillover_types::{Coefficients, Design, Outcomes};

use super::{
    FIXED_POINT_ROUNDS, OutcomeLag, SampleParams, SpatialSample, exogenous_outcomes, validate_size,
};
use crate::draws::Draws;
use crate::error::SimError;
use crate::weights::{WeightBuilder, WeightMatrix};

/// Grid sizes accepted by the SDM generator.
pub const SUPPORTED_SIZES: [usize; 2] = [100, 10_000];

/// Generate an SDM sample.
///
/// # Errors
///
/// Returns [`SimError::InvalidSampleSize`] unless `params.n` is 100 or
/// 10 000, or any error from the weight builder.
pub fn simulate<B: WeightBuilder + ?Sized>(
    builder: &B,
    params: &SampleParams,
) -> Result<SpatialSample, SimError> {
    validate_size(Design::Sdm, params.n)?;

    let draws = Draws::generate(params.n, params.seed);
    let weights = builder.build(params.n, params.k)?;
    let wd = weights.lag(&draws.d_as_f64())?;
    let (outcomes, lag) = spill_over(&params.coefficients, &weights, &draws.d, &draws.x, &wd)?;

    SpatialSample::assemble(
        Design::Sdm,
        params,
        weights,
        draws.d,
        &draws.x,
        &wd,
        outcomes,
        Some(lag),
        None,
    )
}

/// Run the fixed-point rounds from the SLX outcome.
///
/// Returns the final outcomes and the lag state (final `WY` and the
/// starting outcomes).
pub(crate) fn spill_over(
    coefficients: &Coefficients,
    weights: &WeightMatrix,
    d: &[u8],
    x: &[f64],
    wd: &[f64],
) -> Result<(Vec<Outcomes>, OutcomeLag), SimError> {
    let no_spill = exogenous_outcomes(coefficients, d, x, wd);
    let mut current = no_spill.clone();
    let mut wy = vec![0.0; current.len()];

    for round in 0..FIXED_POINT_ROUNDS {
        let y: Vec<f64> = current.iter().map(|o| o.y).collect();
        wy = weights.lag(&y)?;
        let next: Vec<Outcomes> = d
            .iter()
            .zip(x)
            .zip(wd)
            .zip(&wy)
            .map(|(((&d, &x), &wd), &wy)| coefficients.endogenous(x, wd, d, wy))
            .collect();
        let max_change = next
            .iter()
            .zip(&current)
            .map(|(a, b)| (a.y - b.y).abs())
            .fold(0.0, f64::max);
        debug!(round, max_change, "outcome lag round");
        current = next;
    }

    Ok((current, OutcomeLag { wy, no_spill }))
}
