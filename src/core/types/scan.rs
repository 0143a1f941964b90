//! Range scan and point cloud sample types.

use serde::{Deserialize, Serialize};

/// A range scan in polar coordinates.
///
/// A single sweep from a scanning range sensor (or synthesized from a
/// depth camera). Each measurement is a range value at a specific angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeScan {
    /// Start angle in radians
    pub angle_min: f32,
    /// End angle in radians
    pub angle_max: f32,
    /// Angular resolution (radians between consecutive readings)
    pub angle_increment: f32,
    /// Minimum valid range in meters
    pub range_min: f32,
    /// Maximum valid range in meters
    pub range_max: f32,
    /// Range measurements in meters (+∞ = no obstacle)
    pub ranges: Vec<f32>,
}

impl RangeScan {
    /// Create a new scan with the given parameters.
    pub fn new(
        angle_min: f32,
        angle_max: f32,
        angle_increment: f32,
        range_min: f32,
        range_max: f32,
        ranges: Vec<f32>,
    ) -> Self {
        Self {
            angle_min,
            angle_max,
            angle_increment,
            range_min,
            range_max,
            ranges,
        }
    }

    /// Number of range measurements.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if the scan is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The angle of the reading at `index`.
    #[inline]
    pub fn angle_at(&self, index: usize) -> f32 {
        self.angle_min + index as f32 * self.angle_increment
    }
}

/// One sample of a 3D point cloud, in the sensor frame.
///
/// The scan plane is x–z (x sideways, z forward); y is the off-plane
/// offset. Any coordinate may be NaN for invalid returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudPoint {
    /// Sideways offset in meters (positive right)
    pub x: f32,
    /// Off-plane offset in meters
    pub y: f32,
    /// Forward distance in meters
    pub z: f32,
}

impl CloudPoint {
    /// Create a new cloud point.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// True when every coordinate is a number.
    #[inline]
    pub fn is_finite(&self) -> bool {
        !self.x.is_nan() && !self.y.is_nan() && !self.z.is_nan()
    }
}
