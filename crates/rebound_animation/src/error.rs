//! Error types for rebound_animation

use thiserror::Error;

/// Errors raised while building a [`SpringConfig`](crate::SpringConfig)
///
/// These are only ever produced at construction time. Lifecycle calls on a
/// controller (`start`, `cancel`, `end`) never fail; redundant calls are no-ops.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Stiffness must be strictly positive
    #[error("stiffness must be > 0 (got {0})")]
    NonPositiveStiffness(f32),

    /// Damping ratio must be zero or positive
    #[error("damping ratio must be >= 0 (got {0})")]
    NegativeDampingRatio(f32),

    /// Duration, when present, must be zero or positive
    #[error("duration must be >= 0 ms (got {0} ms)")]
    NegativeDuration(f64),

    /// Start delay must be zero or positive
    #[error("start delay must be >= 0 ms (got {0} ms)")]
    NegativeStartDelay(f64),

    /// The physics run-time cap must be strictly positive
    #[error("max run time must be > 0 ms (got {0} ms)")]
    NonPositiveMaxRunTime(f64),

    /// A preset name did not match any known preset
    #[error("unknown spring preset '{0}' (expected one of: gentle, wobbly, stiff, snappy, molasses)")]
    UnknownPreset(String),

    /// A numeric field was NaN or infinite
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
