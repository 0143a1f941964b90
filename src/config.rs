//! Runtime configuration.
//!
//! Loaded from a TOML file at startup; every field has a default so a
//! missing or partial file still yields a runnable configuration.

use serde::Deserialize;
use std::f32::consts::FRAC_PI_2;

use crate::core::types::StampedPose;
use crate::error::ConfigError;

/// Grid window and cell settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Lower x edge of the grid window in meters.
    pub min_x: f32,
    /// Upper x edge of the grid window in meters.
    pub max_x: f32,
    /// Lower y edge of the grid window in meters.
    pub min_y: f32,
    /// Upper y edge of the grid window in meters.
    pub max_y: f32,
    /// Cell size in meters per unit.
    pub precision: f32,
    /// Seconds before a cell observation reads back as unknown.
    pub ttl_secs: f32,
    /// Grow the window to cover out-of-bounds insertions.
    pub resizable: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_x: -10.0,
            max_x: 10.0,
            min_y: -10.0,
            max_y: 10.0,
            precision: 0.05, // 5 cm cells
            ttl_secs: 120.0,
            resizable: false,
        }
    }
}

/// Initial pose override.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InitialPose {
    /// World x in meters.
    pub x: f32,
    /// World y in meters.
    pub y: f32,
    /// Heading in radians.
    pub theta: f32,
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Grid settings.
    pub grid: GridConfig,
    /// Run without external pose sensors, integrating commanded
    /// velocity instead.
    pub simulation: bool,
    /// Fusion loop rate in Hz.
    pub rate_hz: f32,
    /// Starting pose; when absent the per-mode default applies
    /// (simulation starts at (2, 2, 0), live at (0, 0, π/2)).
    pub initial_pose: Option<InitialPose>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            simulation: false,
            rate_hz: 10.0,
            initial_pose: None,
        }
    }
}

impl FusionConfig {
    /// Cell time-to-live in microseconds.
    pub fn ttl_us(&self) -> u64 {
        (self.grid.ttl_secs as f64 * 1e6) as u64
    }

    /// The pose the estimator starts from.
    pub fn initial_pose(&self) -> StampedPose {
        match self.initial_pose {
            Some(p) => StampedPose::new(p.x, p.y, p.theta, 0),
            None if self.simulation => StampedPose::new(2.0, 2.0, 0.0, 0),
            None => StampedPose::new(0.0, 0.0, FRAC_PI_2, 0),
        }
    }

    /// Reject configurations that cannot produce a working engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.grid;
        if !(g.precision > 0.0) {
            return Err(ConfigError::InvalidPrecision(g.precision));
        }
        if !(g.max_x > g.min_x) || !(g.max_y > g.min_y) {
            return Err(ConfigError::InvalidBounds {
                min_x: g.min_x,
                max_x: g.max_x,
                min_y: g.min_y,
                max_y: g.max_y,
            });
        }
        if !(g.ttl_secs > 0.0) {
            return Err(ConfigError::InvalidTtl(g.ttl_secs));
        }
        if !(self.rate_hz > 0.0) {
            return Err(ConfigError::InvalidRate(self.rate_hz));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = FusionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ttl_us(), 120_000_000);
        assert!((config.rate_hz - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_per_mode_initial_pose() {
        let mut config = FusionConfig::default();
        config.simulation = true;
        let pose = config.initial_pose();
        assert_eq!((pose.x, pose.y), (2.0, 2.0));

        config.simulation = false;
        let pose = config.initial_pose();
        assert_eq!((pose.x, pose.y), (0.0, 0.0));
        assert!((pose.theta - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_precision_rejected() {
        let mut config = FusionConfig::default();
        config.grid.precision = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPrecision(_))
        ));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut config = FusionConfig::default();
        config.grid.min_x = 5.0;
        config.grid.max_x = -5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: FusionConfig =
            basic_toml::from_str("simulation = true\n[grid]\nprecision = 0.1\n")
                .expect("toml should parse");
        assert!(config.simulation);
        assert!((config.grid.precision - 0.1).abs() < 1e-6);
        assert!((config.grid.ttl_secs - 120.0).abs() < 1e-6);
    }
}
