//! Spring physics strategy
//!
//! Integrates a unit-mass damped harmonic oscillator toward the target:
//!
//! ```text
//! a = -stiffness * (x - to) - c * v,    c = 2 * damping_ratio * sqrt(stiffness)
//! ```
//!
//! Uses semi-implicit Euler, sub-stepped so no single step exceeds
//! [`MAX_STEP`] or `STABLE_STEP / (sqrt(stiffness) + c)`, whichever is
//! smaller, so `h * omega` and `h * c` stay under 2 for any stiffness or
//! damping. State is kept in `f64`; with `f32` state a spring far from
//! zero can stall a few ulps short of its target and never settle.

use std::time::Duration;

use crate::config::SpringConfig;
use crate::strategy::{Animatable, AnimatedSample};

/// Largest integration step; longer frames are subdivided
pub const MAX_STEP: Duration = Duration::from_millis(4);

/// Step budget per unit of `sqrt(stiffness) + c`
const STABLE_STEP: f64 = 0.5;

/// Largest `|x - to|` that counts as settled (value units)
pub const POSITION_THRESHOLD: f64 = 1e-3;

/// Largest `|v|` that counts as settled (value units per second)
pub const VELOCITY_THRESHOLD: f64 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Settled,
    Cancelled,
}

/// A single-use spring simulation from `from` to `to`
#[derive(Clone, Debug)]
pub struct PhysicsSpring {
    target: f64,
    stiffness: f64,
    damping: f64,
    position: f64,
    velocity: f64,
    elapsed: Duration,
    max_run_time: Duration,
    phase: Phase,
}

impl PhysicsSpring {
    pub fn new(config: &SpringConfig) -> Self {
        Self {
            target: config.to() as f64,
            stiffness: config.stiffness() as f64,
            damping: config.damping_coefficient() as f64,
            position: config.from() as f64,
            velocity: config.initial_velocity() as f64,
            elapsed: Duration::ZERO,
            max_run_time: config.max_run_time(),
            phase: Phase::Idle,
        }
    }

    pub fn value(&self) -> f32 {
        self.position as f32
    }

    pub fn velocity(&self) -> f32 {
        self.velocity as f32
    }

    pub fn target(&self) -> f32 {
        self.target as f32
    }

    /// Motion time accumulated by `tick`
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Check if the spring has come to rest at the target
    pub fn is_settled(&self) -> bool {
        self.phase == Phase::Settled
    }

    /// Begin simulating. No-op unless the spring is idle.
    pub fn start(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::Running;
        }
    }

    /// Stop where it is, without jumping to the target
    pub fn cancel(&mut self) {
        if matches!(self.phase, Phase::Idle | Phase::Running) {
            self.phase = Phase::Cancelled;
        }
    }

    /// Jump to the target and stop
    pub fn finish(&mut self) {
        self.snap_to_target();
    }

    /// Advance the simulation by `dt`
    ///
    /// Does nothing unless running. Returns the sample after the step.
    pub fn tick(&mut self, dt: Duration) -> AnimatedSample {
        if self.phase != Phase::Running {
            return self.sample();
        }

        self.integrate(dt.as_secs_f64());
        self.elapsed += dt;

        if self.at_rest() {
            self.snap_to_target();
        } else if self.elapsed >= self.max_run_time {
            tracing::warn!(
                "spring did not settle within {:?} (x={}, v={}); ending at target",
                self.max_run_time,
                self.position,
                self.velocity
            );
            self.snap_to_target();
        }

        self.sample()
    }

    fn integrate(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }

        let max_step = MAX_STEP
            .as_secs_f64()
            .min(STABLE_STEP / (self.stiffness.sqrt() + self.damping));
        let steps = (dt / max_step).ceil().max(1.0);
        let h = dt / steps;

        for _ in 0..steps as u64 {
            // Velocity first, then position from the new velocity
            let acceleration = self.acceleration(self.position, self.velocity);
            self.velocity += acceleration * h;
            self.position += self.velocity * h;
        }
    }

    fn acceleration(&self, x: f64, v: f64) -> f64 {
        let spring_force = -self.stiffness * (x - self.target);
        let damping_force = -self.damping * v;
        spring_force + damping_force
    }

    fn at_rest(&self) -> bool {
        (self.position - self.target).abs() < POSITION_THRESHOLD
            && self.velocity.abs() < VELOCITY_THRESHOLD
    }

    fn snap_to_target(&mut self) {
        self.position = self.target;
        self.velocity = 0.0;
        self.phase = Phase::Settled;
    }

    fn sample(&self) -> AnimatedSample {
        AnimatedSample {
            value: self.value(),
            velocity: Some(self.velocity()),
            elapsed: self.elapsed,
        }
    }
}

impl Animatable for PhysicsSpring {
    fn start(&mut self) {
        PhysicsSpring::start(self);
    }

    fn cancel(&mut self) {
        PhysicsSpring::cancel(self);
    }

    fn tick(&mut self, dt: Duration) -> AnimatedSample {
        PhysicsSpring::tick(self, dt)
    }

    fn finish(&mut self) {
        PhysicsSpring::finish(self);
    }

    fn current_value(&self) -> f32 {
        self.value()
    }

    fn is_finished(&self) -> bool {
        self.is_settled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpringPreset;

    const FRAME: Duration = Duration::from_nanos(16_666_667);

    fn spring(config: SpringConfig) -> PhysicsSpring {
        let mut spring = PhysicsSpring::new(&config);
        spring.start();
        spring
    }

    #[test]
    fn test_spring_settles_to_target() {
        let mut spring = spring(SpringConfig::new(0.0, 100.0).unwrap());

        // Simulate for 2 seconds at 60fps
        for _ in 0..120 {
            spring.tick(FRAME);
        }

        assert!(spring.is_settled());
        assert_eq!(spring.value(), 100.0);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn test_initial_velocity_is_used() {
        let config = SpringConfig::builder()
            .from(0.0)
            .to(0.0)
            .initial_velocity(50.0)
            .build()
            .unwrap();
        let mut spring = spring(config);

        spring.tick(FRAME);
        assert!(spring.value() > 0.0);
        assert!(!spring.is_settled());
    }

    #[test]
    fn test_critically_damped_does_not_overshoot() {
        let config = SpringConfig::builder()
            .from(0.0)
            .to(1.0)
            .stiffness(300.0)
            .damping_ratio(1.0)
            .build()
            .unwrap();
        let mut spring = spring(config);

        let mut previous = spring.value();
        let mut ticks = 0;
        while !spring.is_settled() {
            spring.tick(FRAME);
            assert!(spring.value() >= previous);
            assert!(spring.value() <= 1.0);
            previous = spring.value();
            ticks += 1;
            assert!(ticks < 600, "critically damped spring failed to settle");
        }
    }

    #[test]
    fn test_underdamped_overshoots() {
        let config = SpringConfig::builder()
            .from(0.0)
            .to(300.0)
            .stiffness(500.0)
            .damping_ratio(0.6)
            .build()
            .unwrap();
        let mut spring = spring(config);

        let mut peak = 0.0_f32;
        for _ in 0..120 {
            peak = peak.max(spring.tick(FRAME).value);
        }
        assert!(peak > 300.0);
        assert!(spring.is_settled());
    }

    #[test]
    fn test_spring_stability_with_large_steps() {
        // Large frames are subdivided, so stiff springs stay bounded
        let config = SpringConfig::builder()
            .preset(SpringPreset::Snappy)
            .from(0.0)
            .to(1000.0)
            .build()
            .unwrap();
        let mut spring = spring(config);

        for _ in 0..100 {
            spring.tick(Duration::from_millis(100));
            assert!(spring.value() < 2000.0);
            assert!(spring.value() > -500.0);
        }
        assert!(spring.is_settled());
    }

    #[test]
    fn test_very_stiff_spring_stays_in_range() {
        let config = SpringConfig::builder()
            .from(0.0)
            .to(1.0)
            .stiffness(500_000.0)
            .damping_ratio(1.0)
            .build()
            .unwrap();

        for frame in [FRAME, Duration::from_millis(100)] {
            let mut spring = spring(config);
            let mut ticks = 0;
            while !spring.is_settled() {
                let value = spring.tick(frame).value;
                assert!(value.is_finite());
                assert!((0.0..=1.0).contains(&value), "value {value} left [0, 1]");
                ticks += 1;
                assert!(ticks < 60, "stiff spring failed to settle");
            }
            assert_eq!(spring.value(), 1.0);
        }
    }

    #[test]
    fn test_far_target_settles() {
        let config = SpringConfig::builder()
            .from(0.0)
            .to(300.0)
            .stiffness(500.0)
            .damping_ratio(0.6)
            .build()
            .unwrap();
        let mut spring = spring(config);

        for _ in 0..50 {
            spring.tick(Duration::from_millis(100));
        }
        assert!(spring.is_settled());
    }

    #[test]
    fn test_undamped_spring_is_capped() {
        let config = SpringConfig::builder()
            .from(0.0)
            .to(10.0)
            .damping_ratio(0.0)
            .max_run_time(Duration::from_secs(1))
            .build()
            .unwrap();
        let mut spring = spring(config);

        let mut ticks = 0;
        while !spring.is_settled() {
            spring.tick(Duration::from_millis(10));
            ticks += 1;
        }

        assert_eq!(ticks, 100);
        assert_eq!(spring.value(), 10.0);
    }

    #[test]
    fn test_tick_before_start_does_nothing() {
        let mut spring = PhysicsSpring::new(&SpringConfig::new(0.0, 1.0).unwrap());
        let sample = spring.tick(FRAME);

        assert_eq!(sample.value, 0.0);
        assert_eq!(sample.elapsed, Duration::ZERO);
        assert!(!spring.is_running());
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut spring = spring(SpringConfig::new(0.0, 1.0).unwrap());
        spring.tick(FRAME);
        let elapsed = spring.elapsed();

        spring.start();
        assert!(spring.is_running());
        assert_eq!(spring.elapsed(), elapsed);
    }

    #[test]
    fn test_cancel_stays_in_place() {
        let mut spring = spring(SpringConfig::new(0.0, 100.0).unwrap());
        for _ in 0..3 {
            spring.tick(FRAME);
        }
        let value = spring.value();

        spring.cancel();
        spring.tick(FRAME);

        assert_eq!(spring.value(), value);
        assert!(!spring.is_running());
        assert!(!spring.is_settled());

        // Single use: cannot be restarted
        spring.start();
        assert!(!spring.is_running());
    }

    #[test]
    fn test_zero_distance_settles_on_first_tick() {
        let mut spring = spring(SpringConfig::new(5.0, 5.0).unwrap());
        spring.tick(Duration::ZERO);
        assert!(spring.is_settled());
    }
}
