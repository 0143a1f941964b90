//! Pixel-space view of a probability grid.
//!
//! Rendering itself belongs to the presentation layer; the pixel→world
//! mapping lives here because other components reuse the same formula.

use super::{ProbabilityGrid, UNKNOWN};
use crate::core::types::Point2D;

/// Linear mapping between a pixel viewport and a world window.
///
/// Pixel `(0, 0)` is the upper-left corner; world y grows upward, so the
/// pixel row axis is flipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Viewport width in pixels
    pub width_px: usize,
    /// Viewport height in pixels
    pub height_px: usize,
    /// World x mapped to the left pixel column
    pub min_x: f32,
    /// World x mapped to the right pixel column
    pub max_x: f32,
    /// World y mapped to the bottom pixel row
    pub min_y: f32,
    /// World y mapped to the top pixel row
    pub max_y: f32,
}

impl Viewport {
    /// World coordinates of a destination pixel:
    /// `x = px·(max_x−min_x)/width + min_x`,
    /// `y = (height−py)·(max_y−min_y)/height + min_y`.
    #[inline]
    pub fn world_at(&self, px: usize, py: usize) -> Point2D {
        Point2D::new(
            px as f32 * (self.max_x - self.min_x) / self.width_px as f32 + self.min_x,
            (self.height_px - py) as f32 * (self.max_y - self.min_y) / self.height_px as f32
                + self.min_y,
        )
    }

    /// Rasterize the grid's probability field as of `now_us` into a
    /// row-major pixel buffer (one probability per pixel, [`UNKNOWN`]
    /// where no usable observation exists).
    pub fn render(&self, grid: &ProbabilityGrid, now_us: u64) -> Vec<f32> {
        let mut pixels = vec![UNKNOWN; self.width_px * self.height_px];
        for py in 0..self.height_px {
            let row = py * self.width_px;
            for px in 0..self.width_px {
                let w = self.world_at(px, py);
                pixels[row + px] = grid.probability_at(w.x, w.y, now_us);
            }
        }
        pixels
    }
}
