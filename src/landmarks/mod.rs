//! Landmark correlation.
//!
//! Converts relative bearing/range detections of fixed markers and
//! cooperating agents into world coordinates, using the pose that was
//! current when each detection was captured (not when it was
//! processed). Positions persist once observed; a per-batch visibility
//! flag tracks what is currently in view.

use serde::{Deserialize, Serialize};

use crate::core::types::Point2D;
use crate::pose::PoseEstimator;

/// Number of fixed marker ids.
pub const MARKER_CAPACITY: usize = 256;
/// Number of cooperating-agent ids.
pub const AGENT_CAPACITY: usize = 3;

/// One relative detection in the sensor frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Landmark id; out-of-range ids are dropped
    pub id: i32,
    /// Sideways offset in meters (positive right)
    pub lateral: f32,
    /// Forward offset in meters
    pub forward: f32,
    /// Capture timestamp in microseconds
    pub stamp_us: u64,
}

/// A landmark's last known world position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFix {
    /// World x in meters
    pub x: f32,
    /// World y in meters
    pub y: f32,
    /// Capture timestamp of the observation, in microseconds
    pub stamp_us: u64,
}

/// Fixed-capacity table of landmark positions indexed by id.
#[derive(Debug, Clone)]
pub struct LandmarkTable {
    positions: Vec<Option<LandmarkFix>>,
    visible: Vec<bool>,
}

impl LandmarkTable {
    /// Create an empty table for ids `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: vec![None; capacity],
            visible: vec![false; capacity],
        }
    }

    /// Number of ids the table covers.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Integrate one detection batch.
    ///
    /// All visibility flags reset first; stored positions are kept.
    /// Each valid detection is projected into world coordinates through
    /// the pose looked up at its capture timestamp. Detections with an
    /// id outside `0..capacity` are silently dropped.
    pub fn integrate(&mut self, batch: &[Detection], estimator: &PoseEstimator) {
        for flag in &mut self.visible {
            *flag = false;
        }
        for det in batch {
            if det.id < 0 || det.id as usize >= self.capacity() {
                log::debug!("dropping detection with out-of-range id {}", det.id);
                continue;
            }
            let id = det.id as usize;

            let bearing = -(det.lateral / det.forward).atan();
            let range = det.lateral.hypot(det.forward);
            let pose = estimator.pose_at(det.stamp_us);
            let world = pose.project(range, bearing);

            self.positions[id] = Some(LandmarkFix {
                x: world.x,
                y: world.y,
                stamp_us: det.stamp_us,
            });
            self.visible[id] = true;
        }
    }

    /// Last known position of `id`, if ever observed.
    #[inline]
    pub fn position(&self, id: usize) -> Option<LandmarkFix> {
        self.positions.get(id).copied().flatten()
    }

    /// True when `id` appeared in the latest batch.
    #[inline]
    pub fn is_visible(&self, id: usize) -> bool {
        self.visible.get(id).copied().unwrap_or(false)
    }

    /// Iterate over every id with a known position.
    pub fn iter_known(&self) -> impl Iterator<Item = (usize, LandmarkFix, bool)> + '_ {
        self.positions
            .iter()
            .enumerate()
            .filter_map(|(id, fix)| fix.map(|f| (id, f, self.visible[id])))
    }

    /// World position of a landmark, if known.
    pub fn world_point(&self, id: usize) -> Option<Point2D> {
        self.position(id).map(|f| Point2D::new(f.x, f.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::StampedPose;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn estimator_at(x: f32, y: f32, theta: f32) -> PoseEstimator {
        PoseEstimator::simulated(StampedPose::new(x, y, theta, 0))
    }

    #[test]
    fn test_detection_straight_ahead() {
        let mut table = LandmarkTable::new(MARKER_CAPACITY);
        let est = estimator_at(1.0, 1.0, 0.0);
        table.integrate(
            &[Detection {
                id: 7,
                lateral: 0.0,
                forward: 2.0,
                stamp_us: 100,
            }],
            &est,
        );
        let fix = table.position(7).expect("marker should be stored");
        assert_relative_eq!(fix.x, 3.0, epsilon = 1e-5);
        assert_relative_eq!(fix.y, 1.0, epsilon = 1e-5);
        assert_eq!(fix.stamp_us, 100);
        assert!(table.is_visible(7));
    }

    #[test]
    fn test_detection_uses_robot_heading() {
        let mut table = LandmarkTable::new(MARKER_CAPACITY);
        // Robot faces +y; a landmark dead ahead is above the robot.
        let est = estimator_at(0.0, 0.0, FRAC_PI_2);
        table.integrate(
            &[Detection {
                id: 0,
                lateral: 0.0,
                forward: 1.5,
                stamp_us: 0,
            }],
            &est,
        );
        let fix = table.position(0).expect("marker should be stored");
        assert_relative_eq!(fix.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(fix.y, 1.5, epsilon = 1e-5);
    }

    #[test]
    fn test_lateral_offset_bearing_sign() {
        let mut table = LandmarkTable::new(MARKER_CAPACITY);
        // Robot at origin facing +x; landmark to the front-right
        // (positive lateral) has negative bearing, so world y < 0.
        let est = estimator_at(0.0, 0.0, 0.0);
        table.integrate(
            &[Detection {
                id: 1,
                lateral: 1.0,
                forward: 1.0,
                stamp_us: 0,
            }],
            &est,
        );
        let fix = table.position(1).expect("marker should be stored");
        assert!(fix.y < 0.0);
        assert_relative_eq!(fix.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(fix.y, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_out_of_range_ids_dropped() {
        let mut table = LandmarkTable::new(AGENT_CAPACITY);
        let est = estimator_at(0.0, 0.0, 0.0);
        table.integrate(
            &[
                Detection {
                    id: -1,
                    lateral: 0.0,
                    forward: 1.0,
                    stamp_us: 0,
                },
                Detection {
                    id: 3,
                    lateral: 0.0,
                    forward: 1.0,
                    stamp_us: 0,
                },
            ],
            &est,
        );
        assert!(table.iter_known().next().is_none());
    }

    #[test]
    fn test_positions_persist_visibility_resets() {
        let mut table = LandmarkTable::new(MARKER_CAPACITY);
        let est = estimator_at(0.0, 0.0, 0.0);
        table.integrate(
            &[Detection {
                id: 4,
                lateral: 0.0,
                forward: 1.0,
                stamp_us: 0,
            }],
            &est,
        );
        assert!(table.is_visible(4));

        // Next batch no longer sees marker 4.
        table.integrate(&[], &est);
        assert!(!table.is_visible(4));
        assert!(table.position(4).is_some());
    }
}
