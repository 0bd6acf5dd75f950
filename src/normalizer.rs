//! Score normalization
//!
//! Rescales raw scores to [0, 1] relative to the finite range of the whole
//! grid. Missing cells are excluded from the range.

use crate::types::ScoreGrid;
use serde::{Deserialize, Serialize};

/// Finite min/max of a score grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    /// Compute the range over finite cells; both bounds are 0 when none exist
    pub fn from_grid(grid: &ScoreGrid) -> Self {
        let bounds = grid.finite_values().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((f64::min(min, v), f64::max(max, v))),
        });

        match bounds {
            Some((min, max)) => Self { min, max },
            None => Self::default(),
        }
    }

    /// True when every finite score is equal (or there are none)
    pub fn is_flat(&self) -> bool {
        self.max == self.min
    }

    /// Map a score into [0, 1]; non-finite scores and flat ranges yield 0
    pub fn normalize(&self, score: f64) -> f64 {
        if !score.is_finite() || self.is_flat() {
            return 0.0;
        }
        // Halved operands keep the span finite for ranges near f64::MAX.
        (score / 2.0 - self.min / 2.0) / (self.max / 2.0 - self.min / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MISSING;

    #[test]
    fn test_range_ignores_missing_cells() {
        let grid = ScoreGrid::from_rows(vec![vec![0.2, MISSING], vec![0.9, 0.4]]);
        let range = ScoreRange::from_grid(&grid);
        assert_eq!(range, ScoreRange { min: 0.2, max: 0.9 });
    }

    #[test]
    fn test_extremes_normalize_to_unit_bounds() {
        let grid = ScoreGrid::from_rows(vec![vec![-3.0, 1.0, 5.0]]);
        let range = ScoreRange::from_grid(&grid);
        assert_eq!(range.normalize(range.min), 0.0);
        assert_eq!(range.normalize(range.max), 1.0);
        assert_eq!(range.normalize(1.0), 0.5);
    }

    #[test]
    fn test_flat_range_normalizes_to_zero() {
        let grid = ScoreGrid::from_rows(vec![vec![0.7], vec![0.7]]);
        let range = ScoreRange::from_grid(&grid);
        assert!(range.is_flat());
        assert_eq!(range.normalize(0.7), 0.0);
        assert_eq!(range.normalize(100.0), 0.0);
    }

    #[test]
    fn test_empty_grid_defaults_to_zero_bounds() {
        let grid = ScoreGrid::from_rows(vec![vec![MISSING, MISSING]]);
        let range = ScoreRange::from_grid(&grid);
        assert_eq!(range, ScoreRange { min: 0.0, max: 0.0 });
        assert_eq!(range.normalize(0.5), 0.0);
    }

    #[test]
    fn test_extreme_range_stays_finite() {
        let grid = ScoreGrid::from_rows(vec![vec![-1e308, 0.0, 1e308]]);
        let range = ScoreRange::from_grid(&grid);
        assert_eq!(range.normalize(range.min), 0.0);
        assert_eq!(range.normalize(range.max), 1.0);
        assert_eq!(range.normalize(0.0), 0.5);
    }

    #[test]
    fn test_non_finite_scores_normalize_to_zero() {
        let range = ScoreRange { min: 0.0, max: 1.0 };
        assert_eq!(range.normalize(f64::NAN), 0.0);
        assert_eq!(range.normalize(f64::INFINITY), 0.0);
    }
}
