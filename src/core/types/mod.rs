//! Foundation types shared across the crate.

mod pose;
mod scan;

pub use pose::{Point2D, StampedPose};
pub use scan::{CloudPoint, RangeScan};
