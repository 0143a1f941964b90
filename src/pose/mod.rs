//! Dual-mode pose estimation.
//!
//! Two mutually exclusive modes, fixed at construction:
//!
//! - **Simulated**: no external pose sensors; the pose is integrated
//!   analytically from commanded velocities (exact circular arc when
//!   turning, straight line otherwise).
//! - **Live**: the pose is driven by external odometry and orientation
//!   streams. The first sample of each stream freezes a calibration
//!   offset aligning sensor-local readings to the world frame; every
//!   live pose update is appended to a bounded history ring so
//!   observations arriving late can be matched to the pose that was
//!   current when they were captured.

mod history;

pub use history::{PoseHistory, HISTORY_CAPACITY};

use crate::core::math::wrap_to_2pi;
use crate::core::types::StampedPose;

/// Angular speeds at or below this integrate as straight-line motion.
const MIN_TURN_RATE: f32 = 1e-5;

/// Frozen odometry calibration: translation plus rotation from the
/// sensor-local frame to the world frame.
#[derive(Debug, Clone, Copy)]
struct OdomOffset {
    x: f32,
    y: f32,
    theta: f32,
}

#[derive(Debug, Clone)]
enum Mode {
    Simulated,
    Live {
        heading_offset: Option<f32>,
        odom_offset: Option<OdomOffset>,
        history: PoseHistory,
    },
}

/// Running pose estimate with mode-specific update rules.
#[derive(Debug, Clone)]
pub struct PoseEstimator {
    pose: StampedPose,
    linear_speed: f32,
    angular_speed: f32,
    mode: Mode,
}

impl PoseEstimator {
    /// Estimator integrating commanded velocity, starting at `initial`.
    pub fn simulated(initial: StampedPose) -> Self {
        Self {
            pose: initial,
            linear_speed: 0.0,
            angular_speed: 0.0,
            mode: Mode::Simulated,
        }
    }

    /// Estimator driven by odometry and orientation streams, starting
    /// at `initial` until the streams calibrate.
    pub fn live(initial: StampedPose) -> Self {
        Self {
            pose: initial,
            linear_speed: 0.0,
            angular_speed: 0.0,
            mode: Mode::Live {
                heading_offset: None,
                odom_offset: None,
                history: PoseHistory::new(),
            },
        }
    }

    /// True when running in simulated mode.
    pub fn is_simulated(&self) -> bool {
        matches!(self.mode, Mode::Simulated)
    }

    /// The current fused pose.
    #[inline]
    pub fn current_pose(&self) -> StampedPose {
        self.pose
    }

    /// Most recently commanded `(linear, angular)` speeds.
    #[inline]
    pub fn speeds(&self) -> (f32, f32) {
        (self.linear_speed, self.angular_speed)
    }

    /// The pose that was current at `stamp_us`.
    ///
    /// Simulated mode has no history and returns the current pose
    /// unconditionally. Live mode consults the history ring (see
    /// [`PoseHistory::lookup`]), falling back to the current pose while
    /// the ring is still empty.
    pub fn pose_at(&self, stamp_us: u64) -> StampedPose {
        match &self.mode {
            Mode::Simulated => self.pose,
            Mode::Live { history, .. } => history.lookup(stamp_us).unwrap_or(self.pose),
        }
    }

    /// Feed one orientation sample (planar quaternion z component).
    ///
    /// Live mode only: the first sample freezes the heading offset so
    /// the fused heading starts at the configured initial heading;
    /// every sample then rewrites the heading component of the pose.
    /// Position and timestamp are untouched by this stream.
    pub fn apply_orientation(&mut self, qz: f32, _stamp_us: u64) {
        if let Mode::Live { heading_offset, .. } = &mut self.mode {
            let heading = 2.0 * qz.clamp(-1.0, 1.0).asin();
            let offset = *heading_offset.get_or_insert(self.pose.theta - heading);
            self.pose.theta = wrap_to_2pi(heading + offset);
        }
    }

    /// Feed one odometry sample.
    ///
    /// Live mode only: the first sample freezes translation and
    /// rotation offsets from the pose current at that instant; every
    /// sample then maps the sensor-reported position through the frozen
    /// transform, overwrites the pose's position and timestamp, and
    /// records the pose in the history ring.
    pub fn apply_odometry(&mut self, x: f32, y: f32, qz: f32, stamp_us: u64) {
        if let Mode::Live {
            odom_offset,
            history,
            ..
        } = &mut self.mode
        {
            let heading = 2.0 * qz.clamp(-1.0, 1.0).asin();
            let offset = *odom_offset.get_or_insert(OdomOffset {
                x: self.pose.x - x,
                y: self.pose.y - y,
                theta: self.pose.theta - heading,
            });

            let (sin_o, cos_o) = offset.theta.sin_cos();
            self.pose.x = x * cos_o - y * sin_o + offset.x;
            self.pose.y = x * sin_o + y * cos_o + offset.y;
            self.pose.stamp_us = stamp_us;

            history.push(self.pose);
        }
    }

    /// Feed one velocity command.
    ///
    /// In simulated mode the *previous* command is integrated over the
    /// time elapsed since the pose's timestamp: a circular arc of
    /// radius `linear/angular` when turning, a straight line otherwise.
    /// The new command then takes effect for the next interval. Live
    /// mode only records the speeds.
    pub fn apply_velocity(&mut self, linear: f32, angular: f32, now_us: u64) {
        if let Mode::Simulated = self.mode {
            let dt = now_us.saturating_sub(self.pose.stamp_us) as f32 / 1e6;
            self.pose.stamp_us = now_us;

            if self.angular_speed.abs() > MIN_TURN_RATE {
                let radius = self.linear_speed / self.angular_speed;
                let delta = self.angular_speed * dt;
                let theta = self.pose.theta;
                self.pose.x += radius * ((delta + theta).sin() - theta.sin());
                self.pose.y -= radius * ((delta + theta).cos() - theta.cos());
                self.pose.theta = wrap_to_2pi(theta + delta);
            } else {
                let (sin_t, cos_t) = self.pose.theta.sin_cos();
                self.pose.x += self.linear_speed * dt * cos_t;
                self.pose.y += self.linear_speed * dt * sin_t;
            }
        }
        self.linear_speed = linear;
        self.angular_speed = angular;
    }
}
