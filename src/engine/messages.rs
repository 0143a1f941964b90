//! Engine boundary messages.
//!
//! Sensor observations enter through a [`SensorEvent`] channel (the
//! transport delivering them is a black box); results leave through an
//! [`OutputSink`] implemented by the host.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::core::types::{CloudPoint, RangeScan};
use crate::grid::GridSnapshot;
use crate::landmarks::Detection;

/// Which grid an occupancy patch feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridSource {
    /// Grid fed by the primary range scanner
    Scan,
    /// Grid fed by the depth camera
    Depth,
}

/// Occupancy patch from an external local-mapping node, centered on the
/// robot. Values are 0..100 (percent occupied); negative means unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyPatch {
    /// Cells along x
    pub width: usize,
    /// Cells along y
    pub height: usize,
    /// Cell size in meters
    pub resolution: f32,
    /// Row-major occupancy values
    pub data: Vec<i8>,
}

/// One sensor observation delivered to the fusion engine.
#[derive(Debug, Clone)]
pub enum SensorEvent {
    /// Native sweep from the primary range scanner
    Scan(RangeScan),
    /// Raw 3D cloud from the depth camera
    DepthCloud(Vec<CloudPoint>),
    /// Orientation sample (planar quaternion z component)
    Orientation {
        /// Quaternion z component
        qz: f32,
        /// Sample timestamp in microseconds
        stamp_us: u64,
    },
    /// Odometry sample in the sensor-local frame
    Odometry {
        /// Sensor-local x in meters
        x: f32,
        /// Sensor-local y in meters
        y: f32,
        /// Quaternion z component
        qz: f32,
        /// Sample timestamp in microseconds
        stamp_us: u64,
    },
    /// Velocity command currently applied to the robot
    Velocity {
        /// Linear speed in m/s
        linear: f32,
        /// Angular speed in rad/s
        angular: f32,
    },
    /// Occupancy patch from a local-mapping node
    Occupancy {
        /// Which grid the patch feeds
        source: GridSource,
        /// The patch itself
        patch: OccupancyPatch,
    },
    /// Fixed-marker detection batch
    Markers(Vec<Detection>),
    /// Cooperating-agent detection batch
    Agents(Vec<Detection>),
}

/// Sender half of the engine's event channel.
pub type EventSender = Sender<SensorEvent>;
/// Receiver half of the engine's event channel.
pub type EventReceiver = Receiver<SensorEvent>;

/// Create the event channel pair. All sensor callbacks funnel through
/// the sender; the engine is the sole consumer.
pub fn create_event_channel() -> (EventSender, EventReceiver) {
    unbounded()
}

/// A named coordinate transform, published every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Frame name
    pub frame: String,
    /// World x in meters
    pub x: f32,
    /// World y in meters
    pub y: f32,
    /// Heading in radians
    pub theta: f32,
    /// Timestamp in microseconds
    pub stamp_us: u64,
}

/// Outbound boundary of the engine.
///
/// The host maps these calls onto its transport; the engine never
/// blocks on them.
pub trait OutputSink {
    /// Re-emit a normalized scan under the given frame id.
    fn publish_scan(&mut self, frame: &str, scan: &RangeScan);
    /// Publish a grid snapshot under the given name.
    fn publish_grid(&mut self, name: &str, snapshot: GridSnapshot);
    /// Publish a named coordinate transform.
    fn publish_transform(&mut self, transform: Transform);
}

/// Sink collecting everything published, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Re-emitted scans with their frame ids
    pub scans: Vec<(String, RangeScan)>,
    /// Published grid snapshots with their names
    pub grids: Vec<(String, GridSnapshot)>,
    /// Published transforms
    pub transforms: Vec<Transform>,
}

impl RecordingSink {
    /// Latest transform published under `frame`, if any.
    pub fn last_transform(&self, frame: &str) -> Option<&Transform> {
        self.transforms.iter().rev().find(|t| t.frame == frame)
    }
}

impl OutputSink for RecordingSink {
    fn publish_scan(&mut self, frame: &str, scan: &RangeScan) {
        self.scans.push((frame.to_string(), scan.clone()));
    }

    fn publish_grid(&mut self, name: &str, snapshot: GridSnapshot) {
        self.grids.push((name.to_string(), snapshot));
    }

    fn publish_transform(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }
}
