//! Time-stamped probability grid.
//!
//! Maps discretized world coordinates to an occupancy probability with
//! a per-cell timestamp. Cells older than the grid's time-to-live read
//! back as unknown. Independent observations landing on the same cell at
//! the same instant fuse via noisy-OR; observations at different times
//! simply overwrite.
//!
//! # Example
//! ```
//! use disha_fusion::grid::{GridBounds, ProbabilityGrid, UNKNOWN};
//!
//! let bounds = GridBounds::new(0.0, 5.0, 0.0, 5.0, 0.05);
//! let mut grid = ProbabilityGrid::new(bounds, 120_000_000, false);
//! grid.insert(2.0, 2.0, 0, 0.8).unwrap();
//! assert!((grid.probability_at(2.01, 1.99, 1_000_000) - 0.8).abs() < 1e-6);
//! assert_eq!(grid.probability_at(2.0, 2.0, 121_000_000), UNKNOWN);
//! ```

mod bounds;
mod raster;

pub use bounds::GridBounds;
pub use raster::Viewport;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Sentinel probability for cells with no usable observation.
pub const UNKNOWN: f32 = -1.0;

/// One occupied cell: snapped world coordinates, observation time and
/// fused probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Snapped world x in meters
    pub x: f32,
    /// Snapped world y in meters
    pub y: f32,
    /// Observation timestamp in microseconds
    pub stamp_us: u64,
    /// Occupancy probability in [0, 1]
    pub probability: f32,
}

/// Column-major dump of a grid's probability field, for publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Probabilities in column-major order (`k = ix * height + iy`);
    /// unknown cells hold [`UNKNOWN`]
    pub data: Vec<f32>,
    /// Cells along x
    pub width: usize,
    /// Cells along y
    pub height: usize,
    /// Cell size in meters per unit
    pub scale: f32,
    /// World x of the grid's lower corner
    pub origin_x: f32,
    /// World y of the grid's lower corner
    pub origin_y: f32,
}

/// Dense probability grid over a growable world window.
///
/// Storage is column-major (`k = ix * height + iy`). A non-resizable
/// grid rejects points outside its window; a resizable grid grows to
/// cover them, reallocating and shifting every surviving cell. Bounds
/// only ever grow.
#[derive(Debug, Clone)]
pub struct ProbabilityGrid {
    bounds: GridBounds,
    ttl_us: u64,
    resizable: bool,
    cells: Vec<Option<GridCell>>,
}

impl ProbabilityGrid {
    /// Create an empty grid over the given window.
    pub fn new(bounds: GridBounds, ttl_us: u64, resizable: bool) -> Self {
        let cells = vec![None; bounds.width() * bounds.height()];
        Self {
            bounds,
            ttl_us,
            resizable,
            cells,
        }
    }

    /// A new empty grid with the same window, precision, ttl and
    /// resizability. Cell data is never duplicated.
    pub fn empty_like(&self) -> Self {
        Self::new(self.bounds, self.ttl_us, self.resizable)
    }

    /// The grid's current world window.
    #[inline]
    pub fn bounds(&self) -> &GridBounds {
        &self.bounds
    }

    /// Cells along x.
    #[inline]
    pub fn width(&self) -> usize {
        self.bounds.width()
    }

    /// Cells along y.
    #[inline]
    pub fn height(&self) -> usize {
        self.bounds.height()
    }

    /// Time-to-live of a cell observation, in microseconds.
    #[inline]
    pub fn ttl_us(&self) -> u64 {
        self.ttl_us
    }

    /// Insert an observation at world coordinates.
    ///
    /// The point snaps to the nearest cell center. If the cell already
    /// holds an observation with the identical timestamp the two
    /// probabilities fuse via noisy-OR (`p' = 1 − (1−p_new)(1−p_old)`);
    /// otherwise the new observation overwrites. Points outside the
    /// window grow a resizable grid and are rejected by a fixed one.
    pub fn insert(&mut self, x: f32, y: f32, stamp_us: u64, p: f32) -> Result<(), GridError> {
        let sx = self.bounds.snap(x);
        let sy = self.bounds.snap(y);

        if !self.bounds.contains(sx, sy) {
            if !self.resizable {
                return Err(GridError::OutOfBounds { x, y });
            }
            let grown = self.bounds.grown_to(sx, sy);
            log::debug!(
                "growing grid to x [{:.2}, {:.2}], y [{:.2}, {:.2}]",
                grown.min_x,
                grown.max_x,
                grown.min_y,
                grown.max_y
            );
            *self = self.resized(grown);
        }

        let (ix, iy) = match self.bounds.cell_index(sx, sy) {
            Some(idx) => idx,
            None => return Err(GridError::OutOfBounds { x, y }),
        };
        let k = ix * self.height() + iy;

        let mut fused = p;
        if let Some(cell) = &self.cells[k] {
            if cell.stamp_us == stamp_us {
                fused = 1.0 - (1.0 - p) * (1.0 - cell.probability);
            }
        }
        self.cells[k] = Some(GridCell {
            x: sx,
            y: sy,
            stamp_us,
            probability: fused,
        });
        Ok(())
    }

    /// A copy of this grid over a larger window.
    ///
    /// Allocates fresh storage and re-places every surviving cell at its
    /// shifted index; the receiver is left untouched. Cells outside the
    /// new window (never the case for grown bounds) are dropped.
    pub fn resized(&self, new_bounds: GridBounds) -> Self {
        let mut resized = Self::new(new_bounds, self.ttl_us, self.resizable);
        for cell in self.cells.iter().flatten() {
            if let Some((ix, iy)) = new_bounds.cell_index(cell.x, cell.y) {
                resized.cells[ix * new_bounds.height() + iy] = Some(*cell);
            }
        }
        resized
    }

    /// Probability at world coordinates as of `now_us`.
    ///
    /// Returns [`UNKNOWN`] for points outside the window, empty cells,
    /// and cells whose observation is at least `ttl` old.
    pub fn probability_at(&self, x: f32, y: f32, now_us: u64) -> f32 {
        let (ix, iy) = match self.bounds.cell_index(self.bounds.snap(x), self.bounds.snap(y)) {
            Some(idx) => idx,
            None => return UNKNOWN,
        };
        match &self.cells[ix * self.height() + iy] {
            Some(cell) if now_us.saturating_sub(cell.stamp_us) < self.ttl_us => cell.probability,
            _ => UNKNOWN,
        }
    }

    /// Full probability field in column-major order.
    ///
    /// Occupied cells report their stored probability regardless of age;
    /// expiry applies to point queries only.
    pub fn snapshot(&self) -> GridSnapshot {
        let data = self
            .cells
            .iter()
            .map(|c| c.as_ref().map_or(UNKNOWN, |cell| cell.probability))
            .collect();
        GridSnapshot {
            data,
            width: self.width(),
            height: self.height(),
            scale: self.bounds.precision,
            origin_x: self.bounds.min_x,
            origin_y: self.bounds.min_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SEC: u64 = 1_000_000;

    fn test_grid(resizable: bool) -> ProbabilityGrid {
        let bounds = GridBounds::new(0.0, 5.0, 0.0, 5.0, 0.05);
        ProbabilityGrid::new(bounds, 120 * SEC, resizable)
    }

    #[test]
    fn test_round_trip_within_ttl() {
        let mut grid = test_grid(false);
        grid.insert(2.0, 2.0, 0, 0.8).unwrap();
        assert_relative_eq!(grid.probability_at(2.0, 2.0, SEC), 0.8, epsilon = 1e-6);
        // Neighboring coordinates snap to the same cell.
        assert_relative_eq!(grid.probability_at(2.01, 1.99, SEC), 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_expiry() {
        let mut grid = test_grid(false);
        grid.insert(2.0, 2.0, 0, 0.8).unwrap();
        assert_relative_eq!(
            grid.probability_at(2.0, 2.0, 119 * SEC),
            0.8,
            epsilon = 1e-6
        );
        assert_eq!(grid.probability_at(2.0, 2.0, 120 * SEC), UNKNOWN);
        assert_eq!(grid.probability_at(2.0, 2.0, 121 * SEC), UNKNOWN);
    }

    #[test]
    fn test_noisy_or_on_identical_timestamp() {
        let mut grid = test_grid(false);
        grid.insert(1.0, 1.0, 500, 0.5).unwrap();
        grid.insert(1.0, 1.0, 500, 0.5).unwrap();
        let expected = 1.0 - (1.0 - 0.5) * (1.0 - 0.5);
        assert_relative_eq!(grid.probability_at(1.0, 1.0, 1000), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_different_timestamp_overwrites() {
        let mut grid = test_grid(false);
        grid.insert(1.0, 1.0, 500, 0.9).unwrap();
        grid.insert(1.0, 1.0, 600, 0.3).unwrap();
        assert_relative_eq!(grid.probability_at(1.0, 1.0, 1000), 0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_rejection_outside_fixed_grid() {
        let mut grid = test_grid(false);
        let err = grid.insert(6.0, 6.0, 0, 0.5);
        assert_eq!(err, Err(GridError::OutOfBounds { x: 6.0, y: 6.0 }));
        assert_eq!(grid.probability_at(6.0, 6.0, 0), UNKNOWN);
    }

    #[test]
    fn test_resize_keeps_existing_points() {
        let mut grid = test_grid(true);
        grid.insert(2.0, 2.0, 0, 0.8).unwrap();
        grid.insert(-1.0, 7.2, 0, 0.6).unwrap();

        // Bounds only grew.
        assert!(grid.bounds().min_x <= 0.0);
        assert!(grid.bounds().max_y >= 7.2);
        assert_relative_eq!(grid.bounds().min_x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(grid.bounds().max_y, 7.2, epsilon = 1e-5);

        // Both points retrievable at their world coordinates.
        assert_relative_eq!(grid.probability_at(2.0, 2.0, SEC), 0.8, epsilon = 1e-6);
        assert_relative_eq!(grid.probability_at(-1.0, 7.2, SEC), 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_resize_just_past_edge_grows_full_meter() {
        let mut grid = test_grid(true);
        grid.insert(5.05, 2.0, 0, 0.4).unwrap();
        assert_relative_eq!(grid.bounds().max_x, 6.0, epsilon = 1e-5);
        assert_relative_eq!(grid.probability_at(5.05, 2.0, SEC), 0.4, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_like_shares_settings_not_data() {
        let mut grid = test_grid(false);
        grid.insert(2.0, 2.0, 0, 0.8).unwrap();
        let copy = grid.empty_like();
        assert_eq!(copy.bounds(), grid.bounds());
        assert_eq!(copy.ttl_us(), grid.ttl_us());
        assert_eq!(copy.probability_at(2.0, 2.0, SEC), UNKNOWN);
    }

    #[test]
    fn test_snapshot_layout() {
        let bounds = GridBounds::new(0.0, 0.1, 0.0, 0.2, 0.1);
        let mut grid = ProbabilityGrid::new(bounds, 120 * SEC, false);
        // 2 columns x 3 rows.
        grid.insert(0.1, 0.2, 0, 0.7).unwrap();
        let snap = grid.snapshot();
        assert_eq!(snap.width, 2);
        assert_eq!(snap.height, 3);
        assert_relative_eq!(snap.scale, 0.1, epsilon = 1e-6);
        assert_eq!(snap.data.len(), 6);
        // Column-major: (ix=1, iy=2) lands at 1*3 + 2.
        assert_relative_eq!(snap.data[5], 0.7, epsilon = 1e-6);
        assert_eq!(snap.data[0], UNKNOWN);
    }

    #[test]
    fn test_snapshot_ignores_ttl() {
        let mut grid = test_grid(false);
        grid.insert(2.0, 2.0, 0, 0.8).unwrap();
        // Stored probabilities stay visible in the dump even once stale.
        let snap = grid.snapshot();
        assert!(snap.data.iter().any(|&p| (p - 0.8).abs() < 1e-6));
    }
}
