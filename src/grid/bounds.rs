//! World-space window of a probability grid.

use serde::{Deserialize, Serialize};

/// Rectangular world window discretized at a fixed precision.
///
/// All four edges are kept at exact multiples of `precision`, so cell
/// indices are stable under growth. Coordinates snap to the nearest cell
/// center with round-half-away-from-zero on `coordinate / precision`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    /// Lower x edge in meters (multiple of `precision`)
    pub min_x: f32,
    /// Upper x edge in meters (multiple of `precision`)
    pub max_x: f32,
    /// Lower y edge in meters (multiple of `precision`)
    pub min_y: f32,
    /// Upper y edge in meters (multiple of `precision`)
    pub max_y: f32,
    /// Cell size in meters per unit
    pub precision: f32,
}

impl GridBounds {
    /// Create bounds with every edge snapped to the precision lattice.
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32, precision: f32) -> Self {
        let snap = |v: f32| precision * (v / precision).round();
        Self {
            min_x: snap(min_x),
            max_x: snap(max_x),
            min_y: snap(min_y),
            max_y: snap(max_y),
            precision,
        }
    }

    /// Snap a world coordinate to the nearest cell center.
    #[inline]
    pub fn snap(&self, v: f32) -> f32 {
        self.precision * (v / self.precision).round()
    }

    /// Number of cells along x.
    #[inline]
    pub fn width(&self) -> usize {
        ((self.max_x - self.min_x) / self.precision).round() as usize + 1
    }

    /// Number of cells along y.
    #[inline]
    pub fn height(&self) -> usize {
        ((self.max_y - self.min_y) / self.precision).round() as usize + 1
    }

    /// Signed cell offsets of a world point from the lower corner.
    #[inline]
    fn offsets(&self, x: f32, y: f32) -> (i64, i64) {
        (
            ((x - self.min_x) / self.precision).round() as i64,
            ((y - self.min_y) / self.precision).round() as i64,
        )
    }

    /// True when the world point snaps to a cell inside the window.
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (ix, iy) = self.offsets(x, y);
        ix >= 0 && iy >= 0 && (ix as usize) < self.width() && (iy as usize) < self.height()
    }

    /// Cell index of a world point, or `None` when outside the window.
    #[inline]
    pub fn cell_index(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        let (ix, iy) = self.offsets(x, y);
        if ix >= 0 && iy >= 0 && (ix as usize) < self.width() && (iy as usize) < self.height() {
            Some((ix as usize, iy as usize))
        } else {
            None
        }
    }

    /// Bounds grown to cover the given (snapped) point.
    ///
    /// An edge the point lies beyond moves to the point itself, or one
    /// full meter past the old edge, whichever is farther. Edges the
    /// point does not cross are untouched; bounds never shrink.
    pub fn grown_to(&self, x: f32, y: f32) -> Self {
        let mut min_x = self.min_x;
        let mut max_x = self.max_x;
        let mut min_y = self.min_y;
        let mut max_y = self.max_y;

        if x < min_x {
            min_x = x;
        } else if x > max_x {
            max_x = (max_x + 1.0).max(x);
        }
        if y < min_y {
            min_y = y;
        } else if y > max_y {
            max_y = (max_y + 1.0).max(y);
        }

        Self::new(min_x, max_x, min_y, max_y, self.precision)
    }
}
