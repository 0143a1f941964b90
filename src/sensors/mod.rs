//! Sensor observation processing.
//!
//! Normalizes heterogeneous distance observations (native range scans,
//! depth clouds flattened by [`cloud::cloud_to_scan`]) into a uniform
//! 0.1°-binned 360° range profile plus a rolling world-frame point
//! cloud, one [`SensorChannel`] per source.

pub mod cloud;

pub use cloud::cloud_to_scan;

use std::f32::consts::PI;

use crate::core::math::wrap_to_2pi;
use crate::core::types::{Point2D, RangeScan, StampedPose};

/// Global angular resolution of the binned profile, in degrees.
pub const ANGLE_PRECISION_DEG: f32 = 0.1;
/// Global angular resolution, in radians.
pub const ANGLE_PRECISION_RAD: f32 = ANGLE_PRECISION_DEG * PI / 180.0;
/// Number of bins in a full 360° profile (360° / 0.1°).
pub const BIN_COUNT: usize = 3600;
/// Ranges beyond this are treated as "no obstacle", in meters.
pub const MAX_RANGE: f32 = 15.0;
/// Capacity of the rolling world-frame point cloud, per channel.
pub const CLOUD_CAPACITY: usize = 1000;

/// Per-source scan state: the angular range profile and the rolling
/// world point cloud with its write cursor.
///
/// One instance exists per sensor source (primary scanner, depth
/// channel); bins persist across sweeps and are refreshed in place.
#[derive(Debug, Clone)]
pub struct SensorChannel {
    bins: Vec<f32>,
    cloud: Vec<Option<Point2D>>,
    cursor: usize,
}

impl Default for SensorChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorChannel {
    /// Create a channel with all bins at +∞ and an empty cloud.
    pub fn new() -> Self {
        Self {
            bins: vec![f32::INFINITY; BIN_COUNT],
            cloud: vec![None; CLOUD_CAPACITY],
            cursor: 0,
        }
    }

    /// Ingest one sweep.
    ///
    /// Normalizes the scan in place (ranges beyond [`MAX_RANGE`] or the
    /// sensor's declared maximum become +∞ — the caller may re-emit the
    /// normalized scan), rebins it onto the fixed 0.1° lattice, and
    /// projects every finite ray through `pose` into the rolling world
    /// cloud. With `rotate_half_turn` the sweep is rotated 180° first
    /// (sensor mounted facing backward).
    ///
    /// Within one call a bin is written once unconditionally, then only
    /// by smaller ranges (closest obstacle wins).
    pub fn ingest(&mut self, scan: &mut RangeScan, rotate_half_turn: bool, pose: &StampedPose) {
        if scan.angle_increment <= 0.0 {
            log::warn!("scan with non-positive angle increment dropped");
            return;
        }
        let nb_ranges = (((scan.angle_max - scan.angle_min) / scan.angle_increment).ceil()
            as usize)
            .min(scan.ranges.len());
        let mut prev_bin: Option<usize> = None;

        for i in 0..nb_ranges {
            if scan.ranges[i] > MAX_RANGE || scan.ranges[i] >= scan.range_max {
                scan.ranges[i] = f32::INFINITY;
            }
            let range = scan.ranges[i];

            let mut angle = wrap_to_2pi(scan.angle_at(i));
            if rotate_half_turn {
                angle = wrap_to_2pi(angle + PI);
            }

            let mut bin = (angle / ANGLE_PRECISION_RAD).round() as usize;
            if bin >= BIN_COUNT {
                bin = 0;
            }
            if prev_bin != Some(bin) {
                prev_bin = Some(bin);
                self.bins[bin] = range;
            } else if self.bins[bin] > range {
                self.bins[bin] = range;
            }

            if range.is_finite() {
                let world = pose.project(range, angle);
                self.cloud[(i + self.cursor) % CLOUD_CAPACITY] = Some(world);
            }
        }
        self.cursor = (self.cursor + nb_ranges) % CLOUD_CAPACITY;
    }

    /// The binned 360° range profile.
    #[inline]
    pub fn bins(&self) -> &[f32] {
        &self.bins
    }

    /// Range of the bin covering `angle` (radians, any winding).
    #[inline]
    pub fn range_at(&self, angle: f32) -> f32 {
        let mut bin = (wrap_to_2pi(angle) / ANGLE_PRECISION_RAD).round() as usize;
        if bin >= BIN_COUNT {
            bin = 0;
        }
        self.bins[bin]
    }

    /// The rolling world-frame point cloud (unset slots are `None`).
    #[inline]
    pub fn cloud(&self) -> &[Option<Point2D>] {
        &self.cloud
    }

    /// Current write cursor into the cloud.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
