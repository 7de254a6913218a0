//! Scalar mapping helpers shared by the block and sample paths.

/// Linear map of `x` (expected in [0, 1]) onto `[lo, hi]`.
///
/// `lo` may be greater than `hi`, giving an inverted mapping.
#[inline]
pub fn linear_map(x: f32, lo: f32, hi: f32) -> f32 {
    lo + x * (hi - lo)
}

/// Clamp `x` into `[lo, hi]`.
///
/// Never panics; a NaN input collapses to `lo`.
#[inline]
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    x.max(lo).min(hi)
}

/// Decibels to linear gain.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db * 0.05)
}

/// Wrap a phase accumulator back into [0, 1).
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase - phase.floor();
    if wrapped >= 1.0 || !wrapped.is_finite() {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_map_endpoints() {
        assert_eq!(linear_map(0.0, 80.0, 1200.0), 80.0);
        assert_eq!(linear_map(1.0, 80.0, 1200.0), 1200.0);
        assert_relative_eq!(linear_map(0.5, 0.2, 0.01), 0.105, epsilon = 1e-6);
    }

    #[test]
    fn clamp_swallows_nan() {
        assert_eq!(clamp(f32::NAN, 20.0, 18000.0), 20.0);
        assert_eq!(clamp(f32::INFINITY, 20.0, 18000.0), 18000.0);
        assert_eq!(clamp(-3.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.25, 0.0, 1.0), 0.25);
    }

    #[test]
    fn db_to_gain_reference_points() {
        assert_relative_eq!(db_to_gain(0.0), 1.0);
        assert_relative_eq!(db_to_gain(20.0), 10.0, epsilon = 1e-4);
        assert_relative_eq!(db_to_gain(24.0), 15.848_932, epsilon = 1e-3);
    }

    #[test]
    fn wrap_phase_stays_in_unit_interval() {
        assert_eq!(wrap_phase(0.0), 0.0);
        assert_relative_eq!(wrap_phase(1.25), 0.25);
        assert_eq!(wrap_phase(1.0), 0.0);
        assert_eq!(wrap_phase(f32::NAN), 0.0);
        let p = wrap_phase(-1e-9);
        assert!((0.0..1.0).contains(&p), "wrapped {p}");
    }
}
