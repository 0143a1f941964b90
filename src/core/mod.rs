//! Foundation layer: basic types and math, no internal dependencies.

pub mod math;
pub mod types;
