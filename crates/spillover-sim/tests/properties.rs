//! Property tests for weight construction and the three generators.
//!
//! These exercise the public API only: weights through [`KnnGrid`] and
//! samples through [`SampleGenerator`].

#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]

use proptest::prelude::*;

use spillover_sim::{
    ASSIGNMENT_THRESHOLD, KnnGrid, SampleGenerator, SampleParams, SimError, WeightBuilder,
    WeightMatrix, supported_sizes,
};
use spillover_types::{Coefficients, Design};

fn assert_knn_shape(w: &WeightMatrix, n: usize, k: usize) {
    assert_eq!(w.len(), n);
    assert_eq!(w.k(), k);
    for i in 0..n {
        assert_eq!(w.nonzero_in_row(i), k, "row {i}");
        assert_eq!(w.get(i, i), 0.0, "diagonal {i}");
        assert!(w.neighbours(i).windows(2).all(|p| p[0] < p[1]));
    }
}

#[test]
fn weights_have_k_entries_for_every_study_size() {
    for n in [100, 2_500, 10_000] {
        let w = KnnGrid.build(n, 10).unwrap();
        assert_knn_shape(&w, n, 10);
    }
}

#[test]
fn every_design_rejects_non_grid_sizes() {
    let generator = SampleGenerator::knn();
    for design in Design::ALL {
        let result = generator.generate(design, &SampleParams::new(7));
        assert!(
            matches!(result, Err(SimError::InvalidSampleSize { n: 7, .. })),
            "{design}"
        );
    }
}

#[test]
fn supported_sizes_differ_by_design() {
    assert_eq!(supported_sizes(Design::Slx), &[100, 10_000]);
    assert_eq!(supported_sizes(Design::Sdm), &[100, 10_000]);
    assert_eq!(supported_sizes(Design::Backdoor), &[100, 2_500]);
}

#[test]
fn fixed_seed_reproduces_every_series() {
    let generator = SampleGenerator::knn();
    for design in Design::ALL {
        let params = SampleParams::new(100).with_seed(2024);
        let a = generator.generate(design, &params).unwrap();
        let b = generator.generate(design, &params).unwrap();
        assert_ne!(a.meta().run_id, b.meta().run_id);
        for (ra, rb) in a.records().iter().zip(b.records()) {
            assert_eq!(ra.outcomes.y.to_bits(), rb.outcomes.y.to_bits());
            assert_eq!(ra.outcomes.y1.to_bits(), rb.outcomes.y1.to_bits());
            assert_eq!(ra.outcomes.y0.to_bits(), rb.outcomes.y0.to_bits());
            assert_eq!(ra.wd.to_bits(), rb.wd.to_bits());
        }
    }
}

#[test]
fn slx_large_grid_keeps_constant_effect() {
    let sample = SampleGenerator::knn()
        .generate(Design::Slx, &SampleParams::new(10_000).with_seed(3))
        .unwrap();
    assert_eq!(sample.len(), 10_000);
    assert!(
        sample
            .records()
            .iter()
            .all(|r| (r.outcomes.y1 - r.outcomes.y0 - 0.25).abs() < 1e-12)
    );
}

#[test]
fn sdm_converges_when_contraction_holds() {
    let coefficients = Coefficients {
        rho: 0.03,
        ..Coefficients::default()
    };
    let params = SampleParams::new(100)
        .with_seed(17)
        .with_coefficients(coefficients);
    let sample = SampleGenerator::knn().generate(Design::Sdm, &params).unwrap();
    assert!(coefficients.rho * sample.weights().max_row_sum() < 1.0);
    assert!(sample.fixed_point_residual().unwrap() < 1e-3);
}

#[test]
fn backdoor_treatment_is_threshold_of_pre_assignment_lag() {
    let sample = SampleGenerator::knn()
        .generate(Design::Backdoor, &SampleParams::new(2_500).with_seed(5))
        .unwrap();
    for r in sample.records() {
        let share = r.wd_assignment.unwrap();
        assert_eq!(u8::from(share > ASSIGNMENT_THRESHOLD), r.d);
    }
}

#[test]
fn prebuilt_weights_give_the_same_sample() {
    let params = SampleParams::new(100).with_seed(99);
    let fresh = SampleGenerator::knn().generate(Design::Sdm, &params).unwrap();
    let cached = SampleGenerator::new(fresh.weights().clone())
        .generate(Design::Sdm, &params)
        .unwrap();
    assert_eq!(fresh.records(), cached.records());
}

proptest! {
    #[test]
    fn knn_shape_holds_on_any_square(side in 2_usize..12, k_frac in 0.0_f64..1.0) {
        let n = side * side;
        let k = 1 + ((n - 2) as f64 * k_frac) as usize;
        let w = KnnGrid.build(n, k).unwrap();
        assert_knn_shape(&w, n, k);
    }

    #[test]
    fn neighbours_are_no_farther_than_excluded_units(side in 3_usize..10, k in 1_usize..8) {
        let n = side * side;
        let w = KnnGrid.build(n, k).unwrap();
        let pos = |u: usize| ((u / side) as i64, (u % side) as i64);
        let dist = |a: usize, b: usize| {
            let (ar, ac) = pos(a);
            let (br, bc) = pos(b);
            (ar - br).pow(2) + (ac - bc).pow(2)
        };
        for i in 0..n {
            let chosen = w.neighbours(i);
            let worst = chosen.iter().map(|&j| dist(i, j)).max().unwrap();
            for j in (0..n).filter(|j| *j != i && !chosen.contains(j)) {
                prop_assert!(dist(i, j) >= worst);
            }
        }
    }
}
