//! Rebound configuration file handling
//!
//! `rebound.toml` holds one animation description plus playback settings:
//!
//! ```toml
//! [animation]
//! from = 0.0
//! to = 300.0
//! duration_ms = 500.0
//!
//! [playback]
//! fps = 120
//! ```

use anyhow::{Context, Result};
use rebound_animation::{SpringPreset, SpringSpec, DEFAULT_FPS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "rebound.toml";

/// Contents of rebound.toml
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ReboundConfig {
    #[serde(default)]
    pub animation: SpringSpec,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

/// How the animation is driven
#[derive(Debug, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Frame rate of the scheduler
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Drive frames from the wall clock instead of a simulated one
    #[serde(default)]
    pub realtime: bool,
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            realtime: false,
        }
    }
}

impl ReboundConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Load `path` if given, otherwise `rebound.toml` in the current
    /// directory if it exists, otherwise defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = Path::new(CONFIG_FILE);
        if default_path.exists() {
            tracing::debug!("Using {}", default_path.display());
            return Self::load(default_path);
        }

        Ok(Self::default())
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ReboundConfig = toml::from_str(content)?;
        if config.playback.fps == 0 {
            anyhow::bail!("playback.fps must be at least 1");
        }
        Ok(config)
    }

    /// Starter configuration written by `rebound init`
    pub fn starter() -> Self {
        Self {
            animation: SpringSpec {
                preset: Some(SpringPreset::Wobbly),
                from: Some(0.0),
                to: Some(300.0),
                initial_velocity: Some(0.0),
                start_delay_ms: Some(0.0),
                ..Default::default()
            },
            playback: PlaybackConfig::default(),
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
