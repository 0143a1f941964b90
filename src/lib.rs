//! disha-fusion - Real-time localization and mapping fusion engine for
//! a mobile robot.
//!
//! Maintains the robot's planar pose from odometry and orientation
//! streams (or from commanded velocity in simulation), fuses noisy
//! relative-position observations into a persistent probability grid
//! with decay, and correlates landmark detections against the pose that
//! was current when they were captured.
//!
//! # Architecture
//!
//! The crate is organized into logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    engine/                          │  ← Composition root
//! │          (event dispatch, fusion loop tick)         │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌──────────────┬──────────────────┬───────────────────┐
//! │    grid/     │    landmarks/    │      pose/        │  ← Fusion state
//! │ (probability │  (marker/agent   │  (dual-mode pose  │
//! │  grid + ttl) │   correlation)   │   + history ring) │
//! └──────────────┴──────────────────┴───────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   sensors/                          │  ← Observation intake
//! │        (angular rebinning, cloud flattening)        │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                 (types, math)                       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! All mutable state is owned by [`engine::FusionEngine`] and mutated
//! from a single logical thread; sensor callbacks only push events into
//! its channel.

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Observation intake (depends on core)
// ============================================================================
pub mod sensors;

// ============================================================================
// Layer 3: Fusion state (depends on core, sensors)
// ============================================================================
pub mod grid;
pub mod landmarks;
pub mod pose;

// ============================================================================
// Layer 4: Orchestration (depends on all layers)
// ============================================================================
pub mod engine;

// ============================================================================
// Cross-cutting: configuration and errors
// ============================================================================
pub mod config;
pub mod error;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::math;
pub use crate::core::types::{CloudPoint, Point2D, RangeScan, StampedPose};

// Grid
pub use grid::{GridBounds, GridCell, GridSnapshot, ProbabilityGrid, Viewport, UNKNOWN};

// Sensors
pub use sensors::{cloud_to_scan, SensorChannel, BIN_COUNT, CLOUD_CAPACITY, MAX_RANGE};

// Pose estimation
pub use pose::{PoseEstimator, PoseHistory, HISTORY_CAPACITY};

// Landmarks
pub use landmarks::{Detection, LandmarkFix, LandmarkTable, AGENT_CAPACITY, MARKER_CAPACITY};

// Engine
pub use engine::{
    create_event_channel, now_us, EventReceiver, EventSender, FusionEngine, GridSource,
    OccupancyPatch, OutputSink, RecordingSink, SensorEvent, Transform,
};

// Configuration and errors
pub use config::{FusionConfig, GridConfig};
pub use error::{ConfigError, GridError};
