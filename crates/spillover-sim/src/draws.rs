//! Seeded treatment and covariate draws.
//!
//! Every sample starts from `N` binary treatments followed by `N` standard
//! normal covariates, drawn in that order from a `ChaCha8` generator seeded
//! with the caller's seed. The same seed always yields the same draws, on
//! every platform.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Raw per-unit draws before any outcome is computed.
#[derive(Debug, Clone, PartialEq)]
pub struct Draws {
    /// Binary treatment, `0` or `1` with equal probability.
    pub d: Vec<u8>,
    /// Standard normal covariate.
    pub x: Vec<f64>,
}

impl Draws {
    /// Draw treatments and covariates for `n` units.
    pub fn generate(n: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let d = (0..n).map(|_| rng.random_range(0..2_u8)).collect();
        let x = (0..n).map(|_| rng.sample::<f64, _>(StandardNormal)).collect();
        Self { d, x }
    }

    /// Treatments as floats, for spatial lags.
    pub fn d_as_f64(&self) -> Vec<f64> {
        treatment_as_f64(&self.d)
    }
}

/// Convert a binary treatment vector to floats.
pub fn treatment_as_f64(d: &[u8]) -> Vec<f64> {
    d.iter().copied().map(f64::from).collect()
}
