//! Square grids of spatial units.
//!
//! Units are laid out row by row: unit `i` of a grid with side `s` sits at
//! `(i / s, i % s)`. Distances are Euclidean on these integer coordinates,
//! compared as squared distances so no floating point is involved.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Integer coordinates of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
}

impl GridPoint {
    /// Squared Euclidean distance to another point.
    pub const fn distance_sq(self, other: Self) -> usize {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        dr.saturating_mul(dr).saturating_add(dc.saturating_mul(dc))
    }
}

/// A `side × side` grid of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    side: usize,
}

impl Grid {
    /// Build the grid holding exactly `n` units.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidSampleSize`] if `n` is zero or not a
    /// perfect square.
    pub fn square(n: usize) -> Result<Self, SimError> {
        let side = n.isqrt();
        if n == 0 || side.checked_mul(side) != Some(n) {
            return Err(SimError::InvalidSampleSize {
                n,
                supported: String::from("non-zero perfect squares"),
            });
        }
        Ok(Self { side })
    }

    /// Units per row.
    pub const fn side(&self) -> usize {
        self.side
    }

    /// Total number of units.
    pub const fn len(&self) -> usize {
        self.side.saturating_mul(self.side)
    }

    /// Always `false`; grids are never empty.
    pub const fn is_empty(&self) -> bool {
        self.side == 0
    }

    /// Coordinates of a unit by flat index.
    pub fn position(&self, unit: usize) -> GridPoint {
        GridPoint {
            row: unit.checked_div(self.side).unwrap_or(0),
            col: unit.checked_rem(self.side).unwrap_or(0),
        }
    }

    /// All unit coordinates in flat-index order.
    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (0..self.len()).map(|unit| self.position(unit))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn study_sizes_are_square() {
        assert_eq!(Grid::square(100).unwrap().side(), 10);
        assert_eq!(Grid::square(2_500).unwrap().side(), 50);
        assert_eq!(Grid::square(10_000).unwrap().side(), 100);
    }

    #[test]
    fn non_square_is_rejected() {
        assert!(matches!(
            Grid::square(7),
            Err(SimError::InvalidSampleSize { n: 7, .. })
        ));
        assert!(Grid::square(0).is_err());
    }

    #[test]
    fn positions_are_row_major() {
        let grid = Grid::square(100).unwrap();
        assert_eq!(grid.position(0), GridPoint { row: 0, col: 0 });
        assert_eq!(grid.position(9), GridPoint { row: 0, col: 9 });
        assert_eq!(grid.position(10), GridPoint { row: 1, col: 0 });
        assert_eq!(grid.position(57), GridPoint { row: 5, col: 7 });
        assert_eq!(grid.points().count(), 100);
    }

    #[test]
    fn squared_distance_is_symmetric() {
        let a = GridPoint { row: 1, col: 4 };
        let b = GridPoint { row: 3, col: 1 };
        assert_eq!(a.distance_sq(b), 13);
        assert_eq!(b.distance_sq(a), 13);
        assert_eq!(a.distance_sq(a), 0);
    }
}
