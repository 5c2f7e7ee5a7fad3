//! Spring-shaped easing curve for duration-based playback

use crate::config::SpringConfig;

/// Tension of the classic "back" ease, roughly 10% overshoot
const BACK_TENSION: f64 = 1.70158;

/// Stiffness at which the time warp is neutral (the default preset)
const REFERENCE_STIFFNESS: f64 = 400.0;

/// Deterministic stand-in for a spring over a fixed duration
///
/// The curve is a back-style cubic whose overshoot comes from the damping
/// ratio (`1 - ratio`, clamped to `[0, 1]`), applied after a time warp
/// `1 - (1 - u)^p` where `p` grows with stiffness. Critically damped and
/// overdamped springs reduce to a plain ease-out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringCurve {
    tension: f64,
    warp: f64,
}

impl SpringCurve {
    pub fn new(stiffness: f32, damping_ratio: f32) -> Self {
        let overshoot = (1.0 - damping_ratio as f64).clamp(0.0, 1.0);
        let warp = (stiffness as f64 / REFERENCE_STIFFNESS).sqrt().clamp(0.5, 2.0);
        Self {
            tension: BACK_TENSION * overshoot,
            warp,
        }
    }

    pub fn from_config(config: &SpringConfig) -> Self {
        Self::new(config.stiffness(), config.damping_ratio())
    }

    /// Map progress `u` to eased progress
    ///
    /// `u` is clamped to `[0, 1]`. The endpoints are exact.
    pub fn apply(&self, u: f32) -> f32 {
        if u <= 0.0 {
            return 0.0;
        }
        if u >= 1.0 {
            return 1.0;
        }

        // Computed in f64 so the curve is smooth at high frame rates
        let x = 1.0 - (1.0 - u as f64).powf(self.warp);
        let c1 = self.tension;
        let c3 = c1 + 1.0;
        let d = x - 1.0;
        (1.0 + c3 * d * d * d + c1 * d * d) as f32
    }

    /// Whether the curve leaves `[0, 1]` at any point
    pub fn overshoots(&self) -> bool {
        self.tension > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_exact() {
        for ratio in [0.0, 0.3, 0.6, 1.0, 2.0] {
            for stiffness in [10.0, 400.0, 5000.0] {
                let curve = SpringCurve::new(stiffness, ratio);
                assert_eq!(curve.apply(0.0), 0.0);
                assert_eq!(curve.apply(1.0), 1.0);
                assert_eq!(curve.apply(-3.0), 0.0);
                assert_eq!(curve.apply(7.0), 1.0);
            }
        }
    }

    #[test]
    fn test_overshoot_follows_damping() {
        let bouncy = SpringCurve::new(400.0, 0.2);
        let damped = SpringCurve::new(400.0, 1.0);

        assert!(bouncy.overshoots());
        assert!(!damped.overshoots());

        let peak = |curve: SpringCurve| {
            (1..100)
                .map(|i| curve.apply(i as f32 / 100.0))
                .fold(f32::MIN, f32::max)
        };
        assert!(peak(bouncy) > 1.0);
        assert!(peak(damped) <= 1.0);
    }

    #[test]
    fn test_damped_curve_is_monotonic() {
        let curve = SpringCurve::new(400.0, 1.5);
        let mut previous = 0.0;
        for i in 1..=100 {
            let value = curve.apply(i as f32 / 100.0);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn test_stiffer_springs_lead() {
        let soft = SpringCurve::new(100.0, 1.0);
        let stiff = SpringCurve::new(1600.0, 1.0);
        assert!(stiff.apply(0.25) > soft.apply(0.25));
    }
}
