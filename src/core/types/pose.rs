//! Pose and point types.

use serde::{Deserialize, Serialize};

use crate::core::math::wrap_to_2pi;

/// A 2D point in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    /// X coordinate in meters
    pub x: f32,
    /// Y coordinate in meters
    pub y: f32,
}

impl Point2D {
    /// Create a new point.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point2D) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Default for Point2D {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// Robot pose at a point in time.
///
/// Position (x, y) in meters, heading in radians normalized to `[0, 2π)`,
/// timestamp in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StampedPose {
    /// X position in meters
    pub x: f32,
    /// Y position in meters
    pub y: f32,
    /// Heading in radians, normalized to [0, 2π)
    pub theta: f32,
    /// Timestamp in microseconds
    pub stamp_us: u64,
}

impl StampedPose {
    /// Create a new pose with the heading wrapped to `[0, 2π)`.
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32, stamp_us: u64) -> Self {
        Self {
            x,
            y,
            theta: wrap_to_2pi(theta),
            stamp_us,
        }
    }

    /// Position component of the pose.
    #[inline]
    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Project a polar measurement `(range, bearing)` taken from this pose
    /// into world coordinates. The bearing is relative to the robot's
    /// forward axis.
    #[inline]
    pub fn project(&self, range: f32, bearing: f32) -> Point2D {
        let (sin_a, cos_a) = (bearing + self.theta).sin_cos();
        Point2D::new(range * cos_a + self.x, range * sin_a + self.y)
    }
}

impl Default for StampedPose {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
            stamp_us: 0,
        }
    }
}
