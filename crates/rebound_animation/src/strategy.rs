//! Strategy selection
//!
//! A run is either simulated ([`PhysicsSpring`]) or interpolated over a fixed
//! duration ([`InterpolatedSpring`]). Which one is decided by [`select`] from
//! the config alone: a `duration` means interpolation, no `duration` means
//! physics. Both sit behind the [`Animatable`] trait so the controller drives
//! them identically.

use std::fmt;
use std::time::Duration;

use crate::config::SpringConfig;
use crate::interpolate::InterpolatedSpring;
use crate::spring::PhysicsSpring;

/// One tick's worth of output
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatedSample {
    pub value: f32,
    /// Only physics runs track velocity
    pub velocity: Option<f32>,
    /// Motion time since the run began (excludes start delay)
    pub elapsed: Duration,
}

/// Lifecycle shared by every value generator
pub trait Animatable {
    /// Begin producing values. No-op if already started.
    fn start(&mut self);

    /// Stop without moving to the end value
    fn cancel(&mut self);

    /// Advance by `dt` and return the new sample
    fn tick(&mut self, dt: Duration) -> AnimatedSample;

    /// Jump to the end value and stop
    fn finish(&mut self);

    fn current_value(&self) -> f32;

    /// Settled (physics) or past the duration (interpolated)
    fn is_finished(&self) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Physics,
    Duration,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Physics => f.write_str("physics"),
            StrategyKind::Duration => f.write_str("duration"),
        }
    }
}

/// The selected value generator for one run
#[derive(Clone, Debug)]
pub enum Strategy {
    Physics(PhysicsSpring),
    Duration(InterpolatedSpring),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Physics(_) => StrategyKind::Physics,
            Strategy::Duration(_) => StrategyKind::Duration,
        }
    }

    fn inner(&self) -> &dyn Animatable {
        match self {
            Strategy::Physics(spring) => spring,
            Strategy::Duration(spring) => spring,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Animatable {
        match self {
            Strategy::Physics(spring) => spring,
            Strategy::Duration(spring) => spring,
        }
    }
}

impl Animatable for Strategy {
    fn start(&mut self) {
        self.inner_mut().start();
    }

    fn cancel(&mut self) {
        self.inner_mut().cancel();
    }

    fn tick(&mut self, dt: Duration) -> AnimatedSample {
        self.inner_mut().tick(dt)
    }

    fn finish(&mut self) {
        self.inner_mut().finish();
    }

    fn current_value(&self) -> f32 {
        self.inner().current_value()
    }

    fn is_finished(&self) -> bool {
        self.inner().is_finished()
    }
}

/// Pick the strategy for `config`
///
/// Only the presence of `duration` matters; every other field is shared by
/// both strategies.
pub fn select(config: &SpringConfig) -> Strategy {
    match config.duration() {
        Some(duration) => Strategy::Duration(InterpolatedSpring::new(config, duration)),
        None => Strategy::Physics(PhysicsSpring::new(config)),
    }
}
