//! Scene runtime configuration.
//!
//! ```json
//! { "max_resolve_iterations": 512, "anchor_mode": "origin", "time_scale": 1.0 }
//! ```
//!
//! Every field is optional; missing fields take their defaults. The loaded
//! config is stored in the world as a resource and read by the resolver and
//! the frame pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default bound on resolver iterations per pass.
pub const DEFAULT_MAX_RESOLVE_ITERATIONS: usize = 512;

/// How a resolved position relates to the entity's anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    /// `position` is the anchor point; the anchor offset is only stored in
    /// `GlobalTransform::origin` for the renderer to apply.
    #[default]
    Origin,
    /// `position` is the top-left corner: the anchor offset is subtracted.
    Offset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Iterations the resolver may spend draining dirty entities before it
    /// gives up and force-cleans. Must be at least 1.
    pub max_resolve_iterations: usize,
    pub anchor_mode: AnchorMode,
    /// Multiplier on frame delta. Must be finite and non-negative.
    pub time_scale: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_resolve_iterations: DEFAULT_MAX_RESOLVE_ITERATIONS,
            anchor_mode: AnchorMode::Origin,
            time_scale: 1.0,
        }
    }
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&contents)?;
        log::debug!("loaded scene config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_resolve_iterations == 0 {
            return Err(ConfigError::Invalid(
                "max_resolve_iterations must be at least 1".into(),
            ));
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "time_scale must be finite and non-negative, got {}",
                self.time_scale
            )));
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
