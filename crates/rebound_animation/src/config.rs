//! Spring configuration
//!
//! A [`SpringConfig`] describes one animation run: the endpoints, the
//! oscillator parameters shared by both strategies, and the timing fields.
//! The presence of a `duration` is the only thing that decides whether the
//! run is physics-driven or interpolated over a fixed time span.
//!
//! Configs are immutable and validated once, in [`SpringConfigBuilder::build`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Physics runs that have not settled after this long are ended
pub const DEFAULT_MAX_RUN_TIME: Duration = Duration::from_secs(10);

/// Named stiffness / damping ratio pairs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpringPreset {
    /// A gentle, slow spring (good for page transitions)
    Gentle,
    /// A wobbly spring with overshoot (good for playful UI)
    Wobbly,
    /// A stiff, snappy spring (good for buttons)
    #[default]
    Stiff,
    /// A very stiff spring with minimal oscillation (good for quick responses)
    Snappy,
    /// A slow spring with no overshoot (critically damped)
    Molasses,
}

impl SpringPreset {
    pub const ALL: [SpringPreset; 5] = [
        SpringPreset::Gentle,
        SpringPreset::Wobbly,
        SpringPreset::Stiff,
        SpringPreset::Snappy,
        SpringPreset::Molasses,
    ];

    /// `(stiffness, damping_ratio)` for this preset
    pub fn params(self) -> (f32, f32) {
        match self {
            SpringPreset::Gentle => (120.0, 0.64),
            SpringPreset::Wobbly => (180.0, 0.45),
            SpringPreset::Stiff => (400.0, 0.75),
            SpringPreset::Snappy => (600.0, 0.82),
            SpringPreset::Molasses => (100.0, 1.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpringPreset::Gentle => "gentle",
            SpringPreset::Wobbly => "wobbly",
            SpringPreset::Stiff => "stiff",
            SpringPreset::Snappy => "snappy",
            SpringPreset::Molasses => "molasses",
        }
    }
}

impl fmt::Display for SpringPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpringPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        SpringPreset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

/// Validated configuration for a single animation run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    from: f32,
    to: f32,
    stiffness: f32,
    damping_ratio: f32,
    initial_velocity: f32,
    duration: Option<Duration>,
    start_delay: Duration,
    max_run_time: Duration,
}

impl SpringConfig {
    pub fn builder() -> SpringConfigBuilder {
        SpringConfigBuilder::default()
    }

    /// Shorthand for a physics run between two values with default parameters
    pub fn new(from: f32, to: f32) -> Result<Self> {
        Self::builder().from(from).to(to).build()
    }

    pub fn from(&self) -> f32 {
        self.from
    }

    pub fn to(&self) -> f32 {
        self.to
    }

    pub fn stiffness(&self) -> f32 {
        self.stiffness
    }

    pub fn damping_ratio(&self) -> f32 {
        self.damping_ratio
    }

    pub fn initial_velocity(&self) -> f32 {
        self.initial_velocity
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn start_delay(&self) -> Duration {
        self.start_delay
    }

    pub fn max_run_time(&self) -> Duration {
        self.max_run_time
    }

    /// Damping coefficient for a unit mass: `2 * ratio * sqrt(stiffness)`
    pub fn damping_coefficient(&self) -> f32 {
        2.0 * self.damping_ratio * self.stiffness.sqrt()
    }

    /// Check if the spring is underdamped (will oscillate)
    pub fn is_underdamped(&self) -> bool {
        self.damping_ratio < 1.0
    }

    /// Check if the spring is critically damped (no oscillation, fastest settling)
    pub fn is_critically_damped(&self) -> bool {
        (self.damping_ratio - 1.0).abs() < 0.01
    }

    /// Check if the spring is overdamped (slow settling, no oscillation)
    pub fn is_overdamped(&self) -> bool {
        self.damping_ratio > 1.0
    }
}

/// Builder for [`SpringConfig`]
///
/// Times are held in milliseconds until `build()` so that negative values
/// coming from files or command lines can be reported instead of clamped.
#[derive(Clone, Debug)]
pub struct SpringConfigBuilder {
    from: f32,
    to: f32,
    stiffness: f32,
    damping_ratio: f32,
    initial_velocity: f32,
    duration_ms: Option<f64>,
    start_delay_ms: f64,
    max_run_time_ms: f64,
}

impl Default for SpringConfigBuilder {
    fn default() -> Self {
        let (stiffness, damping_ratio) = SpringPreset::default().params();
        Self {
            from: 0.0,
            to: 1.0,
            stiffness,
            damping_ratio,
            initial_velocity: 0.0,
            duration_ms: None,
            start_delay_ms: 0.0,
            max_run_time_ms: duration_to_millis(DEFAULT_MAX_RUN_TIME),
        }
    }
}

impl SpringConfigBuilder {
    pub fn from(mut self, from: f32) -> Self {
        self.from = from;
        self
    }

    pub fn to(mut self, to: f32) -> Self {
        self.to = to;
        self
    }

    pub fn stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn damping_ratio(mut self, damping_ratio: f32) -> Self {
        self.damping_ratio = damping_ratio;
        self
    }

    /// Apply a preset's stiffness and damping ratio
    pub fn preset(self, preset: SpringPreset) -> Self {
        let (stiffness, damping_ratio) = preset.params();
        self.stiffness(stiffness).damping_ratio(damping_ratio)
    }

    /// Starting rate of change in value units per second (physics mode only)
    pub fn initial_velocity(mut self, velocity: f32) -> Self {
        self.initial_velocity = velocity;
        self
    }

    /// Play over a fixed duration instead of simulating physics
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(duration_to_millis(duration));
        self
    }

    pub fn duration_ms(mut self, ms: f64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    /// Go back to physics mode
    pub fn without_duration(mut self) -> Self {
        self.duration_ms = None;
        self
    }

    pub fn start_delay(mut self, delay: Duration) -> Self {
        self.start_delay_ms = duration_to_millis(delay);
        self
    }

    pub fn start_delay_ms(mut self, ms: f64) -> Self {
        self.start_delay_ms = ms;
        self
    }

    pub fn max_run_time(mut self, max: Duration) -> Self {
        self.max_run_time_ms = duration_to_millis(max);
        self
    }

    pub fn max_run_time_ms(mut self, ms: f64) -> Self {
        self.max_run_time_ms = ms;
        self
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> Result<SpringConfig> {
        finite("from", self.from as f64)?;
        finite("to", self.to as f64)?;
        finite("stiffness", self.stiffness as f64)?;
        finite("damping_ratio", self.damping_ratio as f64)?;
        finite("initial_velocity", self.initial_velocity as f64)?;
        finite("start_delay", self.start_delay_ms)?;
        finite("max_run_time", self.max_run_time_ms)?;
        if let Some(ms) = self.duration_ms {
            finite("duration", ms)?;
        }

        if self.stiffness <= 0.0 {
            return Err(ConfigError::NonPositiveStiffness(self.stiffness));
        }
        if self.damping_ratio < 0.0 {
            return Err(ConfigError::NegativeDampingRatio(self.damping_ratio));
        }
        if let Some(ms) = self.duration_ms.filter(|ms| *ms < 0.0) {
            return Err(ConfigError::NegativeDuration(ms));
        }
        if self.start_delay_ms < 0.0 {
            return Err(ConfigError::NegativeStartDelay(self.start_delay_ms));
        }
        if self.max_run_time_ms <= 0.0 {
            return Err(ConfigError::NonPositiveMaxRunTime(self.max_run_time_ms));
        }

        Ok(SpringConfig {
            from: self.from,
            to: self.to,
            stiffness: self.stiffness,
            damping_ratio: self.damping_ratio,
            initial_velocity: self.initial_velocity,
            duration: self.duration_ms.map(millis_to_duration),
            start_delay: millis_to_duration(self.start_delay_ms),
            max_run_time: millis_to_duration(self.max_run_time_ms),
        })
    }
}

/// Plain-data mirror of [`SpringConfig`] for files and command lines
///
/// Every field is optional. `into_config` starts from the defaults, applies
/// `preset` if present, then any explicit fields on top of it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpringSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<SpringPreset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damping_ratio: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_velocity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_delay_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_run_time_ms: Option<f64>,
}

impl SpringSpec {
    /// Layer `overrides` on top of `self`; fields set in `overrides` win
    pub fn merge(self, overrides: SpringSpec) -> SpringSpec {
        SpringSpec {
            preset: overrides.preset.or(self.preset),
            from: overrides.from.or(self.from),
            to: overrides.to.or(self.to),
            stiffness: overrides.stiffness.or(self.stiffness),
            damping_ratio: overrides.damping_ratio.or(self.damping_ratio),
            initial_velocity: overrides.initial_velocity.or(self.initial_velocity),
            duration_ms: overrides.duration_ms.or(self.duration_ms),
            start_delay_ms: overrides.start_delay_ms.or(self.start_delay_ms),
            max_run_time_ms: overrides.max_run_time_ms.or(self.max_run_time_ms),
        }
    }

    pub fn into_config(self) -> Result<SpringConfig> {
        let mut builder = SpringConfig::builder();
        if let Some(preset) = self.preset {
            builder = builder.preset(preset);
        }
        if let Some(from) = self.from {
            builder = builder.from(from);
        }
        if let Some(to) = self.to {
            builder = builder.to(to);
        }
        if let Some(stiffness) = self.stiffness {
            builder = builder.stiffness(stiffness);
        }
        if let Some(ratio) = self.damping_ratio {
            builder = builder.damping_ratio(ratio);
        }
        if let Some(velocity) = self.initial_velocity {
            builder = builder.initial_velocity(velocity);
        }
        if let Some(ms) = self.duration_ms {
            builder = builder.duration_ms(ms);
        }
        if let Some(ms) = self.start_delay_ms {
            builder = builder.start_delay_ms(ms);
        }
        if let Some(ms) = self.max_run_time_ms {
            builder = builder.max_run_time_ms(ms);
        }
        builder.build()
    }
}

impl TryFrom<SpringSpec> for SpringConfig {
    type Error = ConfigError;

    fn try_from(spec: SpringSpec) -> Result<Self> {
        spec.into_config()
    }
}

fn finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

// Whole nanoseconds so millisecond inputs like 150.0 map to exact durations
fn millis_to_duration(ms: f64) -> Duration {
    Duration::from_nanos((ms * 1_000_000.0).round() as u64)
}

fn duration_to_millis(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}
