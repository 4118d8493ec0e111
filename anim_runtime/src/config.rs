//! Playback configuration.
//!
//! Strict JSON: unknown keys are rejected, missing keys take their
//! default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("frames_per_step must be at least 1")]
    ZeroFrames,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaybackConfig {
    /// Pause at every Step barrier until `advance()` is called.
    pub step_mode: bool,
    /// Interpolation frames a renderer should spend on one segment.
    pub frames_per_step: u32,
    /// Run world invariant checks after every played segment.
    pub validate_each_segment: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            step_mode: false,
            frames_per_step: 30,
            validate_each_segment: true,
        }
    }
}

impl PlaybackConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PlaybackConfig = serde_json::from_str(json)?;
        if config.frames_per_step == 0 {
            return Err(ConfigError::ZeroFrames);
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Step-through playback, as used by interactive front ends.
    pub fn stepping() -> Self {
        Self {
            step_mode: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        assert_eq!(PlaybackConfig::from_json_str("{}").unwrap(), PlaybackConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let c =
            PlaybackConfig::from_json_str(r#"{"step_mode": true, "frames_per_step": 5}"#).unwrap();
        assert!(c.step_mode);
        assert_eq!(c.frames_per_step, 5);
        assert!(c.validate_each_segment);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = PlaybackConfig::from_json_str(r#"{"speed": 2}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_frames_rejected() {
        let err = PlaybackConfig::from_json_str(r#"{"frames_per_step": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroFrames));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = PlaybackConfig::load(Path::new("/nonexistent/anim.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
