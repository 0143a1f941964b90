//! Error types.
//!
//! Expected per-sample conditions (NaN samples, out-of-range ids) are
//! filtered inline by their handlers and never surface as errors; only
//! grid insertion rejection and startup configuration problems have
//! error types.

use thiserror::Error;

/// Errors from grid operations.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GridError {
    /// Point lies outside the bounds of a non-resizable grid.
    /// Not fatal: the insertion is dropped and the caller may count it.
    #[error("point ({x:.3}, {y:.3}) outside non-resizable grid bounds")]
    OutOfBounds {
        /// World x of the rejected point
        x: f32,
        /// World y of the rejected point
        y: f32,
    },
}

/// Fatal configuration problems detected at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Grid precision must be strictly positive.
    #[error("grid precision must be > 0, got {0}")]
    InvalidPrecision(f32),

    /// Grid window must have positive extent on both axes.
    #[error("grid bounds are inverted or empty: x [{min_x}, {max_x}], y [{min_y}, {max_y}]")]
    InvalidBounds {
        /// Lower x edge
        min_x: f32,
        /// Upper x edge
        max_x: f32,
        /// Lower y edge
        min_y: f32,
        /// Upper y edge
        max_y: f32,
    },

    /// Cell time-to-live must be strictly positive.
    #[error("cell ttl must be > 0 seconds, got {0}")]
    InvalidTtl(f32),

    /// Loop rate must be strictly positive.
    #[error("loop rate must be > 0 Hz, got {0}")]
    InvalidRate(f32),
}
