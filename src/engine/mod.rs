//! Fusion engine: the composition root.
//!
//! Owns the grids, sensor channels, pose estimator and landmark tables,
//! and sequences them once per tick. All sensor observations arrive
//! through a single-consumer event channel drained non-blockingly at
//! the start of each tick; results leave through an [`OutputSink`].
//! The engine holds no algorithmic complexity of its own.

pub mod messages;

pub use messages::{
    create_event_channel, EventReceiver, EventSender, GridSource, OccupancyPatch, OutputSink,
    RecordingSink, SensorEvent, Transform,
};

use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::FusionConfig;
use crate::core::types::StampedPose;
use crate::error::ConfigError;
use crate::grid::{GridBounds, ProbabilityGrid};
use crate::landmarks::{LandmarkTable, AGENT_CAPACITY, MARKER_CAPACITY};
use crate::pose::PoseEstimator;
use crate::sensors::{cloud_to_scan, SensorChannel};

/// Frame id of the robot pose transform.
pub const ROBOT_FRAME: &str = "fusion/robot";
/// Frame id of the scan grid origin.
pub const SCAN_GRID_FRAME: &str = "fusion/scan_grid";
/// Frame id of the depth grid origin.
pub const DEPTH_GRID_FRAME: &str = "fusion/depth_grid";
/// Frame id the normalized primary scan is re-emitted under.
pub const SCAN_FRAME: &str = "fusion/scan";
/// Frame id the synthesized depth scan is re-emitted under.
pub const DEPTH_FRAME: &str = "fusion/depth";

/// Wall-clock time in microseconds since the Unix epoch.
pub fn now_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// The fusion engine. See the module docs.
pub struct FusionEngine {
    estimator: PoseEstimator,
    scan_channel: SensorChannel,
    depth_channel: SensorChannel,
    scan_grid: ProbabilityGrid,
    depth_grid: ProbabilityGrid,
    markers: LandmarkTable,
    agents: LandmarkTable,
    events: EventReceiver,
    rejected_insertions: u64,
}

impl FusionEngine {
    /// Build an engine from a validated configuration and the receiving
    /// half of the event channel.
    pub fn new(config: &FusionConfig, events: EventReceiver) -> Result<Self, ConfigError> {
        config.validate()?;

        let bounds = GridBounds::new(
            config.grid.min_x,
            config.grid.max_x,
            config.grid.min_y,
            config.grid.max_y,
            config.grid.precision,
        );
        let scan_grid = ProbabilityGrid::new(bounds, config.ttl_us(), config.grid.resizable);
        let depth_grid = scan_grid.empty_like();

        let initial = config.initial_pose();
        let estimator = if config.simulation {
            PoseEstimator::simulated(initial)
        } else {
            PoseEstimator::live(initial)
        };
        log::info!(
            "fusion engine ready: {} mode, grid {}x{} cells at {:.3} m",
            if config.simulation { "simulated" } else { "live" },
            scan_grid.width(),
            scan_grid.height(),
            config.grid.precision,
        );

        Ok(Self {
            estimator,
            scan_channel: SensorChannel::new(),
            depth_channel: SensorChannel::new(),
            scan_grid,
            depth_grid,
            markers: LandmarkTable::new(MARKER_CAPACITY),
            agents: LandmarkTable::new(AGENT_CAPACITY),
            events,
            rejected_insertions: 0,
        })
    }

    /// Run one tick: drain pending events, then publish the robot
    /// transform, the grid origins and every known landmark position.
    pub fn tick(&mut self, now_us: u64, sink: &mut dyn OutputSink) {
        while let Ok(event) = self.events.try_recv() {
            self.dispatch(event, now_us, sink);
        }
        self.publish_transforms(now_us, sink);
    }

    /// The current fused pose.
    pub fn current_pose(&self) -> StampedPose {
        self.estimator.current_pose()
    }

    /// The grid fed by the primary scanner.
    pub fn scan_grid(&self) -> &ProbabilityGrid {
        &self.scan_grid
    }

    /// The grid fed by the depth channel.
    pub fn depth_grid(&self) -> &ProbabilityGrid {
        &self.depth_grid
    }

    /// Marker position table.
    pub fn markers(&self) -> &LandmarkTable {
        &self.markers
    }

    /// Agent position table.
    pub fn agents(&self) -> &LandmarkTable {
        &self.agents
    }

    /// Insertions rejected by a non-resizable grid so far.
    pub fn rejected_insertions(&self) -> u64 {
        self.rejected_insertions
    }

    fn dispatch(&mut self, event: SensorEvent, now_us: u64, sink: &mut dyn OutputSink) {
        match event {
            SensorEvent::Scan(mut scan) => {
                let pose = self.estimator.current_pose();
                // Live hardware mounts the scanner facing backward.
                let rotate = !self.estimator.is_simulated();
                self.scan_channel.ingest(&mut scan, rotate, &pose);
                sink.publish_scan(SCAN_FRAME, &scan);
            }
            SensorEvent::DepthCloud(points) => {
                let pose = self.estimator.current_pose();
                let mut scan = cloud_to_scan(&points);
                self.depth_channel.ingest(&mut scan, false, &pose);
                sink.publish_scan(DEPTH_FRAME, &scan);
            }
            SensorEvent::Orientation { qz, stamp_us } => {
                self.estimator.apply_orientation(qz, stamp_us);
            }
            SensorEvent::Odometry { x, y, qz, stamp_us } => {
                self.estimator.apply_odometry(x, y, qz, stamp_us);
            }
            SensorEvent::Velocity { linear, angular } => {
                self.estimator.apply_velocity(linear, angular, now_us);
            }
            SensorEvent::Occupancy { source, patch } => {
                self.apply_occupancy(source, &patch, now_us);
                let (name, grid) = match source {
                    GridSource::Scan => (SCAN_GRID_FRAME, &self.scan_grid),
                    GridSource::Depth => (DEPTH_GRID_FRAME, &self.depth_grid),
                };
                sink.publish_grid(name, grid.snapshot());
            }
            SensorEvent::Markers(batch) => {
                self.markers.integrate(&batch, &self.estimator);
            }
            SensorEvent::Agents(batch) => {
                self.agents.integrate(&batch, &self.estimator);
            }
        }
    }

    /// Forward an occupancy patch, centered on the current pose, into
    /// the corresponding grid cell by cell. Rejections by a
    /// non-resizable grid are counted, never fatal.
    fn apply_occupancy(&mut self, source: GridSource, patch: &OccupancyPatch, now_us: u64) {
        if patch.data.len() < patch.width * patch.height {
            log::warn!(
                "occupancy patch shorter than {}x{} cells dropped",
                patch.width,
                patch.height
            );
            return;
        }
        let pose = self.estimator.current_pose();
        let grid = match source {
            GridSource::Scan => &mut self.scan_grid,
            GridSource::Depth => &mut self.depth_grid,
        };

        let mut rejected = 0u64;
        for y in 0..patch.height {
            let row = y * patch.width;
            let fy = pose.y + (y as i64 - (patch.height / 2) as i64) as f32 * patch.resolution;
            for x in 0..patch.width {
                let value = patch.data[row + x];
                if value < 0 {
                    continue;
                }
                let p = value as f32 / 100.0;
                let fx = pose.x + (x as i64 - (patch.width / 2) as i64) as f32 * patch.resolution;
                if grid.insert(fx, fy, now_us, p).is_err() {
                    rejected += 1;
                }
            }
        }
        if rejected > 0 {
            self.rejected_insertions += rejected;
            log::debug!("{} occupancy cells fell outside the grid", rejected);
        }
    }

    fn publish_transforms(&self, now_us: u64, sink: &mut dyn OutputSink) {
        let pose = self.estimator.current_pose();
        sink.publish_transform(Transform {
            frame: ROBOT_FRAME.to_string(),
            x: pose.x,
            y: pose.y,
            theta: pose.theta,
            stamp_us: now_us,
        });

        for (frame, grid) in [
            (SCAN_GRID_FRAME, &self.scan_grid),
            (DEPTH_GRID_FRAME, &self.depth_grid),
        ] {
            sink.publish_transform(Transform {
                frame: frame.to_string(),
                x: grid.bounds().min_x,
                y: grid.bounds().min_y,
                theta: 0.0,
                stamp_us: now_us,
            });
        }

        for (prefix, table) in [("fusion/marker", &self.markers), ("fusion/agent", &self.agents)]
        {
            for (id, fix, _visible) in table.iter_known() {
                sink.publish_transform(Transform {
                    frame: format!("{}_{}", prefix, id),
                    x: fix.x,
                    y: fix.y,
                    theta: 0.0,
                    stamp_us: fix.stamp_us,
                });
            }
        }
    }
}
