//! Duration-based spring strategy
//!
//! Plays `from -> to` over a fixed duration through a [`SpringCurve`]. The
//! value at any elapsed time is a pure function of that time, so runs are
//! reproducible and end exactly when the duration has elapsed.

use std::time::Duration;

use crate::config::SpringConfig;
use crate::easing::SpringCurve;
use crate::strategy::{Animatable, AnimatedSample};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Finished,
    Cancelled,
}

/// A single-use interpolation over a fixed duration
#[derive(Clone, Debug)]
pub struct InterpolatedSpring {
    from: f32,
    to: f32,
    duration: Duration,
    curve: SpringCurve,
    elapsed: Duration,
    value: f32,
    phase: Phase,
}

impl InterpolatedSpring {
    pub fn new(config: &SpringConfig, duration: Duration) -> Self {
        Self {
            from: config.from(),
            to: config.to(),
            duration,
            curve: SpringCurve::from_config(config),
            elapsed: Duration::ZERO,
            value: config.from(),
            phase: Phase::Idle,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Progress through the duration, 0.0 to 1.0
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return if self.phase == Phase::Finished { 1.0 } else { 0.0 };
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0) as f32
    }

    /// Value at `elapsed` since motion began, without touching state
    pub fn sample_at(&self, elapsed: Duration) -> f32 {
        if elapsed >= self.duration {
            return self.to;
        }
        let u = (elapsed.as_secs_f64() / self.duration.as_secs_f64()) as f32;
        self.from + (self.to - self.from) * self.curve.apply(u)
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn start(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::Running;
        }
    }

    pub fn cancel(&mut self) {
        if matches!(self.phase, Phase::Idle | Phase::Running) {
            self.phase = Phase::Cancelled;
        }
    }

    /// Jump to the end value and stop
    pub fn finish(&mut self) {
        self.elapsed = self.elapsed.max(self.duration);
        self.value = self.to;
        self.phase = Phase::Finished;
    }

    /// Advance by `dt`. Does nothing unless running.
    pub fn tick(&mut self, dt: Duration) -> AnimatedSample {
        if self.phase == Phase::Running {
            self.elapsed += dt;
            self.value = self.sample_at(self.elapsed);
            if self.elapsed >= self.duration {
                self.phase = Phase::Finished;
            }
        }

        AnimatedSample {
            value: self.value,
            velocity: None,
            elapsed: self.elapsed,
        }
    }
}

impl Animatable for InterpolatedSpring {
    fn start(&mut self) {
        InterpolatedSpring::start(self);
    }

    fn cancel(&mut self) {
        InterpolatedSpring::cancel(self);
    }

    fn tick(&mut self, dt: Duration) -> AnimatedSample {
        InterpolatedSpring::tick(self, dt)
    }

    fn finish(&mut self) {
        InterpolatedSpring::finish(self);
    }

    fn current_value(&self) -> f32 {
        self.value
    }

    fn is_finished(&self) -> bool {
        InterpolatedSpring::is_finished(self)
    }
}
