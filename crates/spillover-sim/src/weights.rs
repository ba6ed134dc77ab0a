//! k-nearest-neighbour spatial weight matrices.
//!
//! A [`WeightMatrix`] is an `N×N` non-negative matrix where entry `(i, j)`
//! is nonzero iff unit `j` is one of unit `i`'s `k` nearest neighbours. The
//! diagonal is always zero and every row has exactly `k` nonzero entries,
//! so the matrix is stored row-compressed: `k` neighbour indices and `k`
//! weights per row, neighbours ascending within a row. [`WeightMatrix::get`]
//! and [`WeightMatrix::to_dense`] give the dense view.
//!
//! # Neighbour ties
//!
//! On a grid many candidates sit at the same distance. Ties are broken by
//! ascending flat index, which makes construction fully deterministic.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SimError;
use crate::grid::Grid;

/// Source of weight matrices for the sample generators.
///
/// Generators receive their weights through this trait rather than building
/// them directly, so callers can swap the construction or reuse a matrix
/// across many samples.
pub trait WeightBuilder {
    /// Build the weight matrix for `n` units with `k` neighbours each.
    fn build(&self, n: usize, k: usize) -> Result<WeightMatrix, SimError>;
}

/// Builds binary k-nearest-neighbour weights on a square grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KnnGrid;

impl WeightBuilder for KnnGrid {
    fn build(&self, n: usize, k: usize) -> Result<WeightMatrix, SimError> {
        WeightMatrix::knn_grid(n, k)
    }
}

/// A prebuilt matrix hands out copies of itself for its own shape.
impl WeightBuilder for WeightMatrix {
    fn build(&self, n: usize, k: usize) -> Result<WeightMatrix, SimError> {
        if self.n != n || self.k != k {
            return Err(SimError::WeightShapeMismatch {
                n,
                k,
                actual_n: self.n,
                actual_k: self.k,
            });
        }
        Ok(self.clone())
    }
}

/// Row-compressed `N×N` spatial weight matrix with `k` entries per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightMatrix {
    n: usize,
    k: usize,
    /// Neighbour indices, `k` per row, ascending within each row.
    neighbours: Vec<usize>,
    /// Weights aligned with `neighbours`.
    weights: Vec<f64>,
    row_normalized: bool,
}

impl WeightMatrix {
    /// Binary k-nearest-neighbour weights for the square grid of `n` units.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidSampleSize`] if `n` is not a perfect
    /// square, or [`SimError::TooManyNeighbours`] if `k` is zero or at
    /// least `n`.
    pub fn knn_grid(n: usize, k: usize) -> Result<Self, SimError> {
        let grid = Grid::square(n)?;
        if k == 0 || k >= n {
            return Err(SimError::TooManyNeighbours { k, n });
        }

        let points: Vec<_> = grid.points().collect();
        let mut neighbours = Vec::with_capacity(n.saturating_mul(k));
        let mut candidates: Vec<(usize, usize)> = Vec::with_capacity(n.saturating_sub(1));

        for (i, &origin) in points.iter().enumerate() {
            candidates.clear();
            candidates.extend(
                points
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(j, &p)| (origin.distance_sq(p), j)),
            );
            // (distance, index) ordering puts the lower index first on ties.
            candidates.select_nth_unstable(k.saturating_sub(1));
            candidates.truncate(k);
            let mut row: Vec<usize> = candidates.iter().map(|&(_, j)| j).collect();
            row.sort_unstable();
            neighbours.extend(row);
        }

        debug!(n, k, side = grid.side(), "knn grid weights built");

        Ok(Self {
            n,
            k,
            weights: vec![1.0; neighbours.len()],
            neighbours,
            row_normalized: false,
        })
    }

    /// Number of units (rows and columns).
    pub const fn len(&self) -> usize {
        self.n
    }

    /// Whether the matrix has no units.
    pub const fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Neighbours per unit.
    pub const fn k(&self) -> usize {
        self.k
    }

    /// Whether rows have been scaled to sum to one.
    pub const fn is_row_normalized(&self) -> bool {
        self.row_normalized
    }

    /// Neighbour indices of unit `i`, ascending. Empty if `i` is out of range.
    pub fn neighbours(&self, i: usize) -> &[usize] {
        self.row_range(i)
            .and_then(|r| self.neighbours.get(r))
            .unwrap_or(&[])
    }

    /// Entry `(i, j)` of the dense matrix.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let Some(range) = self.row_range(i) else {
            return 0.0;
        };
        let (Some(cols), Some(vals)) = (self.neighbours.get(range.clone()), self.weights.get(range))
        else {
            return 0.0;
        };
        cols.binary_search(&j)
            .ok()
            .and_then(|pos| vals.get(pos).copied())
            .unwrap_or(0.0)
    }

    /// Number of nonzero entries in row `i`.
    pub fn nonzero_in_row(&self, i: usize) -> usize {
        self.row_range(i)
            .and_then(|r| self.weights.get(r))
            .map_or(0, |row| row.iter().filter(|w| **w != 0.0).count())
    }

    /// Row sums of the matrix.
    pub fn row_sums(&self) -> Vec<f64> {
        self.weights
            .chunks_exact(self.k.max(1))
            .map(|row| row.iter().sum())
            .collect()
    }

    /// Largest row sum (the infinity norm, an upper bound on the spectral
    /// radius of a non-negative matrix).
    pub fn max_row_sum(&self) -> f64 {
        self.row_sums().into_iter().fold(0.0, f64::max)
    }

    /// Copy of this matrix with every row scaled to sum to one.
    #[must_use]
    pub fn row_normalized(&self) -> Self {
        let weights = self
            .weights
            .chunks_exact(self.k.max(1))
            .flat_map(|row| {
                let total: f64 = row.iter().sum();
                row.iter()
                    .map(move |w| if total > 0.0 { w / total } else { 0.0 })
            })
            .collect();
        Self {
            n: self.n,
            k: self.k,
            neighbours: self.neighbours.clone(),
            weights,
            row_normalized: true,
        }
    }

    /// Spatial lag `W·v`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::LengthMismatch`] if `values` does not have one
    /// entry per unit.
    pub fn lag(&self, values: &[f64]) -> Result<Vec<f64>, SimError> {
        if values.len() != self.n {
            return Err(SimError::LengthMismatch {
                expected: self.n,
                actual: values.len(),
            });
        }
        let k = self.k.max(1);
        Ok(self
            .neighbours
            .chunks_exact(k)
            .zip(self.weights.chunks_exact(k))
            .map(|(cols, vals)| {
                cols.iter()
                    .zip(vals)
                    .map(|(&j, &w)| w * values.get(j).copied().unwrap_or(0.0))
                    .sum()
            })
            .collect())
    }

    /// Dense row-major `N×N` copy of the matrix.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.n.saturating_mul(self.n)];
        let k = self.k.max(1);
        for (i, (cols, vals)) in self
            .neighbours
            .chunks_exact(k)
            .zip(self.weights.chunks_exact(k))
            .enumerate()
        {
            let offset = i.saturating_mul(self.n);
            for (&j, &w) in cols.iter().zip(vals) {
                if let Some(cell) = dense.get_mut(offset.saturating_add(j)) {
                    *cell = w;
                }
            }
        }
        dense
    }

    fn row_range(&self, i: usize) -> Option<core::ops::Range<usize>> {
        if i >= self.n {
            return None;
        }
        let start = i.checked_mul(self.k)?;
        Some(start..start.checked_add(self.k)?)
    }
}
