//! Mathematical primitives for planar pose arithmetic.
//!
//! Headings throughout the crate live on `[0, 2π)`; these helpers keep
//! them there.

use std::f32::consts::TAU;

/// Wrap an angle to `[0, 2π)`.
///
/// # Example
/// ```
/// use disha_fusion::core::math::wrap_to_2pi;
/// use std::f32::consts::{PI, TAU};
///
/// assert!((wrap_to_2pi(-PI) - PI).abs() < 1e-6);
/// assert!(wrap_to_2pi(TAU) < 1e-6);
/// ```
#[inline]
pub fn wrap_to_2pi(angle: f32) -> f32 {
    let a = angle % TAU;
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

/// Signed shortest angular difference from `a` to `b`, in `(-π, π]`.
#[inline]
pub fn angle_diff(a: f32, b: f32) -> f32 {
    let d = wrap_to_2pi(b - a);
    if d > std::f32::consts::PI {
        d - TAU
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    #[test]
    fn test_wrap_zero() {
        assert_relative_eq!(wrap_to_2pi(0.0), 0.0);
    }

    #[test]
    fn test_wrap_positive() {
        assert_relative_eq!(wrap_to_2pi(PI), PI);
        assert_relative_eq!(wrap_to_2pi(TAU + 0.5), 0.5, epsilon = 1e-6);
        assert_relative_eq!(wrap_to_2pi(3.0 * TAU), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_wrap_negative() {
        assert_relative_eq!(wrap_to_2pi(-0.5), TAU - 0.5, epsilon = 1e-6);
        assert_relative_eq!(wrap_to_2pi(-PI), PI, epsilon = 1e-6);
        assert_relative_eq!(wrap_to_2pi(-TAU), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_wrap_stays_in_range() {
        for i in -20..20 {
            let a = wrap_to_2pi(i as f32 * 0.7);
            assert!((0.0..TAU).contains(&a), "out of range: {}", a);
        }
    }

    #[test]
    fn test_angle_diff_simple() {
        assert_relative_eq!(angle_diff(0.0, PI / 2.0), PI / 2.0);
        assert_relative_eq!(angle_diff(PI / 2.0, 0.0), -PI / 2.0);
    }

    #[test]
    fn test_angle_diff_crossing_zero() {
        assert_relative_eq!(angle_diff(TAU - 0.1, 0.1), 0.2, epsilon = 1e-6);
        assert_relative_eq!(angle_diff(0.1, TAU - 0.1), -0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_wrap_handles_nan() {
        assert!(wrap_to_2pi(f32::NAN).is_nan());
    }
}
