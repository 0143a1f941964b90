//! Point-cloud flattening.
//!
//! Collapses a 3D point cloud from a depth camera into a planar range
//! scan covering the camera's field of view, so depth data can flow
//! through the same channel as a native range scan.

use crate::core::types::{CloudPoint, RangeScan};
use crate::sensors::ANGLE_PRECISION_RAD;

/// Half-angle of the synthesized scan's field of view, in radians.
const FOV_HALF_ANGLE: f32 = 30.0 * std::f32::consts::PI / 180.0;
/// Points farther than this from the scan plane are ignored, in meters.
const PLANE_HALF_WIDTH: f32 = 0.5;
/// Range limits of the synthesized scan, in meters.
const SYNTH_RANGE_MIN: f32 = 0.45;
const SYNTH_RANGE_MAX: f32 = 15.0;

/// Flatten a 3D point cloud into a range scan.
///
/// Points with a NaN coordinate, points more than half a meter off the
/// scan plane, and points outside the range or field-of-view limits are
/// silently dropped. Each angular ray keeps the minimum range observed
/// (closest obstacle wins); rays with no observation stay at +∞.
pub fn cloud_to_scan(points: &[CloudPoint]) -> RangeScan {
    let nb_rays = ((2.0 * FOV_HALF_ANGLE) / ANGLE_PRECISION_RAD).ceil() as usize;
    let mut scan = RangeScan::new(
        -FOV_HALF_ANGLE,
        FOV_HALF_ANGLE,
        ANGLE_PRECISION_RAD,
        SYNTH_RANGE_MIN,
        SYNTH_RANGE_MAX,
        vec![f32::INFINITY; nb_rays],
    );

    let mut dropped = 0usize;
    for point in points {
        if !point.is_finite() {
            dropped += 1;
            continue;
        }
        if point.y.abs() > PLANE_HALF_WIDTH {
            continue;
        }
        let range = point.x.hypot(point.z);
        if range < scan.range_min || range > scan.range_max {
            continue;
        }
        let angle = -point.x.atan2(point.z);
        if angle < scan.angle_min || angle > scan.angle_max {
            continue;
        }
        let index = (((angle - scan.angle_min) / scan.angle_increment) as usize).min(nb_rays - 1);
        if range < scan.ranges[index] {
            scan.ranges[index] = range;
        }
    }
    if dropped > 0 {
        log::debug!("dropped {} NaN cloud points", dropped);
    }
    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_forward_point_lands_on_center_ray() {
        let points = [CloudPoint::new(0.0, 0.0, 2.0)];
        let scan = cloud_to_scan(&points);
        let center = scan.ranges.len() / 2;
        let hit = scan
            .ranges
            .iter()
            .position(|r| r.is_finite())
            .expect("point should land on a ray");
        assert!((hit as i64 - center as i64).abs() <= 1);
        assert_relative_eq!(scan.ranges[hit], 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_nan_points_dropped() {
        let points = [
            CloudPoint::new(f32::NAN, 0.0, 2.0),
            CloudPoint::new(0.0, f32::NAN, 2.0),
        ];
        let scan = cloud_to_scan(&points);
        assert!(scan.ranges.iter().all(|r| r.is_infinite()));
    }

    #[test]
    fn test_off_plane_points_dropped() {
        let points = [CloudPoint::new(0.0, 0.7, 2.0)];
        let scan = cloud_to_scan(&points);
        assert!(scan.ranges.iter().all(|r| r.is_infinite()));
    }

    #[test]
    fn test_out_of_range_points_dropped() {
        let points = [
            CloudPoint::new(0.0, 0.0, 0.2),  // below range_min
            CloudPoint::new(0.0, 0.0, 20.0), // beyond range_max
        ];
        let scan = cloud_to_scan(&points);
        assert!(scan.ranges.iter().all(|r| r.is_infinite()));
    }

    #[test]
    fn test_out_of_fov_points_dropped() {
        // Bearing ~ -45°, outside the ±30° window.
        let points = [CloudPoint::new(2.0, 0.0, 2.0)];
        let scan = cloud_to_scan(&points);
        assert!(scan.ranges.iter().all(|r| r.is_infinite()));
    }

    #[test]
    fn test_closest_obstacle_wins_per_ray() {
        // All three land on the same ray; only the closest survives.
        let points = [
            CloudPoint::new(0.0, 0.0, 3.0),
            CloudPoint::new(0.0, 0.0, 2.0),
            CloudPoint::new(0.0, 0.0, 4.0),
        ];
        let scan = cloud_to_scan(&points);
        let hit = scan
            .ranges
            .iter()
            .position(|r| r.is_finite())
            .expect("points should land on a ray");
        assert_relative_eq!(scan.ranges[hit], 2.0, epsilon = 1e-5);
        assert_eq!(scan.ranges.iter().filter(|r| r.is_finite()).count(), 1);
    }

    #[test]
    fn test_bearing_sign() {
        // A point to the right (positive x) maps to a negative bearing,
        // so it lands below the center ray.
        let points = [CloudPoint::new(0.5, 0.0, 2.0)];
        let scan = cloud_to_scan(&points);
        let hit = scan
            .ranges
            .iter()
            .position(|r| r.is_finite())
            .expect("point should land on a ray");
        assert!(hit < scan.ranges.len() / 2);
    }
}
