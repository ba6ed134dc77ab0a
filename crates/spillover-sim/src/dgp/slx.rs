//! Exogenous-spillover sample (SLX design).
//!
//! `Y = β·X + γ·WD + γ·D` with `WD = W·D` on the binary weights. The
//! outcome is a closed-form function of the draws; no iteration.

use spillover_types::Design;

use super::{SampleParams, SpatialSample, exogenous_outcomes, validate_size};
use crate::draws::Draws;
use crate::error::SimError;
use crate::weights::WeightBuilder;

/// Grid sizes accepted by the SLX generator.
pub const SUPPORTED_SIZES: [usize; 2] = [100, 10_000];

/// Generate an SLX sample.
///
/// # Errors
///
/// Returns [`SimError::InvalidSampleSize`] unless `params.n` is 100 or
/// 10 000, or any error from the weight builder.
pub fn simulate<B: WeightBuilder + ?Sized>(
    builder: &B,
    params: &SampleParams,
) -> Result<SpatialSample, SimError> {
    validate_size(Design::Slx, params.n)?;

    let draws = Draws::generate(params.n, params.seed);
    let weights = builder.build(params.n, params.k)?;
    let wd = weights.lag(&draws.d_as_f64())?;
    let outcomes = exogenous_outcomes(&params.coefficients, &draws.d, &draws.x, &wd);

    SpatialSample::assemble(
        Design::Slx,
        params,
        weights,
        draws.d,
        &draws.x,
        &wd,
        outcomes,
        None,
        None,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::weights::KnnGrid;

    #[test]
    fn potential_outcomes_differ_by_gamma() {
        let sample = simulate(&KnnGrid, &SampleParams::new(100).with_seed(1)).unwrap();
        for r in sample.records() {
            assert!((r.outcomes.effect() - 0.25).abs() < 1e-12);
            let gap = r.outcomes.y1 - r.outcomes.y;
            assert!((gap - 0.25 * (1.0 - f64::from(r.d))).abs() < 1e-12);
        }
    }

    #[test]
    fn wd_counts_treated_neighbours() {
        let sample = simulate(&KnnGrid, &SampleParams::new(100).with_seed(2)).unwrap();
        let d: Vec<u8> = sample.records().iter().map(|r| r.d).collect();
        for r in sample.records() {
            let treated = sample
                .weights()
                .neighbours(r.unit)
                .iter()
                .filter(|&&j| d.get(j) == Some(&1))
                .count();
            assert!((r.wd - treated as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn slx_has_no_outcome_lag() {
        let sample = simulate(&KnnGrid, &SampleParams::new(100)).unwrap();
        assert!(sample.records().iter().all(|r| r.wy.is_none() && r.no_spill.is_none()));
        assert_eq!(sample.meta().iterations, 0);
        assert!(sample.fixed_point_residual().unwrap() < 1e-12);
    }

    #[test]
    fn unsupported_sizes_fail() {
        for n in [7, 2_500, 400] {
            assert!(matches!(
                simulate(&KnnGrid, &SampleParams::new(n)),
                Err(SimError::InvalidSampleSize { .. })
            ));
        }
    }
}
