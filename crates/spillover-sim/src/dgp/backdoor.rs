//! Backdoor design: treatment assigned from the neighbourhood.
//!
//! After the usual draws, `WD` is the share of each unit's neighbours drawn
//! as treated (`W·D / k`). Each unit's treatment is overwritten with `1` iff
//! that share exceeds [`ASSIGNMENT_THRESHOLD`], and the outcome follows the
//! SDM process with the reassigned treatment and that same `WD`, so
//! treatment and outcome share the neighbourhood as a common cause.

use tracing::debug;

use spillover_types::Design;

use super::{ASSIGNMENT_THRESHOLD, SampleParams, SpatialSample, sdm, validate_size};
use crate::draws::Draws;
use crate::error::SimError;
use crate::weights::WeightBuilder;

/// Grid sizes accepted by the backdoor generator.
pub const SUPPORTED_SIZES: [usize; 2] = [100, 2_500];

/// Generate a backdoor-design sample.
///
/// # Errors
///
/// Returns [`SimError::InvalidSampleSize`] unless `params.n` is 100 or
/// 2 500, or any error from the weight builder.
pub fn simulate<B: WeightBuilder + ?Sized>(
    builder: &B,
    params: &SampleParams,
) -> Result<SpatialSample, SimError> {
    validate_size(Design::Backdoor, params.n)?;

    let draws = Draws::generate(params.n, params.seed);
    let weights = builder.build(params.n, params.k)?;

    let k = weights.k() as f64;
    let wd: Vec<f64> = weights
        .lag(&draws.d_as_f64())?
        .into_iter()
        .map(|wd| wd / k)
        .collect();
    let d: Vec<u8> = wd
        .iter()
        .map(|&share| u8::from(share > ASSIGNMENT_THRESHOLD))
        .collect();
    debug!(
        drawn_treated = draws.d.iter().filter(|d| **d == 1).count(),
        assigned_treated = d.iter().filter(|d| **d == 1).count(),
        "treatment reassigned from neighbourhood"
    );

    let (outcomes, lag) = sdm::spill_over(&params.coefficients, &weights, &d, &draws.x, &wd)?;

    SpatialSample::assemble(
        Design::Backdoor,
        params,
        weights,
        d,
        &draws.x,
        &wd,
        outcomes,
        Some(lag),
        Some(wd.clone()),
    )
}
