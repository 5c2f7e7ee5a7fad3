//! Rebound Animation
//!
//! Single-value spring animations that run either as a physics simulation or
//! as a fixed-duration interpolation, behind one controller.
//!
//! # Features
//!
//! - **Spring Physics**: semi-implicit integration of a damped oscillator,
//!   ending when position and velocity settle at the target
//! - **Duration Mode**: deterministic playback over a fixed time span with a
//!   spring-shaped curve and exact endpoints
//! - **Strategy Switch**: setting a `duration` is the only thing that selects
//!   duration mode; all other parameters mean the same in both modes
//! - **Frame Scheduling**: injectable [`FrameScheduler`] with a fake clock for
//!   tests and a monotonic clock for real frame loops
//! - **Listeners**: `on_start`, `on_update`, `on_cancel`, `on_end` with a fixed
//!   ordering guarantee
//!
//! ```ignore
//! use std::rc::Rc;
//! use rebound_animation::{AnimationController, Callbacks, FrameLoop, SpringConfig};
//!
//! let frames = Rc::new(FrameLoop::new());
//! let config = SpringConfig::builder().from(0.0).to(300.0).duration_ms(500.0).build()?;
//! let controller = AnimationController::new(config, frames.clone());
//! controller.add_listener(Callbacks::new().on_update(|v| println!("{v}")));
//! controller.start();
//! frames.run_until_idle();
//! ```

pub mod config;
pub mod controller;
pub mod easing;
pub mod error;
pub mod interpolate;
pub mod listener;
pub mod scheduler;
pub mod spring;
pub mod strategy;

pub use config::{SpringConfig, SpringConfigBuilder, SpringPreset, SpringSpec, DEFAULT_MAX_RUN_TIME};
pub use controller::{AnimationController, AnimationState, ControllerHandle};
pub use easing::SpringCurve;
pub use error::{ConfigError, Result};
pub use interpolate::InterpolatedSpring;
pub use listener::{AnimationListener, Callbacks, ListenerId};
pub use scheduler::{
    CancelToken, FrameCallback, FrameLoop, FrameScheduler, ManualScheduler, DEFAULT_FPS,
};
pub use spring::PhysicsSpring;
pub use strategy::{select, Animatable, AnimatedSample, Strategy, StrategyKind};
