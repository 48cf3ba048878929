/// Tunable constants for the rotation/unwrap controller
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Controller tuning, loadable from TOML. Missing keys fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Degrees of yaw per unit of horizontal pointer travel
    pub drag_sensitivity: f64,
    /// Auto-rotation speed in degrees per second
    pub auto_rotation_speed: f64,
    /// Damping rate while the wrapper opens
    pub unwrap_rate: f64,
    /// Damping rate while the wrapper closes
    pub wrap_rate: f64,
    /// Damping rate of the pitch toward its progress-derived target
    pub pitch_rate: f64,
    pub wrapped_pitch: f64,
    pub unwrapped_pitch: f64,
    pub initial_pitch: f64,
    pub initial_yaw: f64,
    /// Idle time after a drag before auto-rotation resumes
    pub resume_delay_secs: f64,
    /// Upper bound on the elapsed time fed into a single frame
    pub max_frame_delta_secs: f64,
    /// Horizontal separation of each wrapper half when fully unwrapped
    pub wrapper_open_offset: f64,
    /// Outward tilt of each wrapper half (degrees) when fully unwrapped
    pub wrapper_open_tilt: f64,
    pub sheen_min: f64,
    pub sheen_max: f64,
    /// Container size that maps to a scale of 1.0
    pub base_scene_width: f64,
    pub base_scene_height: f64,
    pub min_scale: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.35,
            auto_rotation_speed: 14.5,
            unwrap_rate: 3.5,
            wrap_rate: 2.2,
            pitch_rate: 4.0,
            wrapped_pitch: -10.0,
            unwrapped_pitch: 15.0,
            initial_pitch: 20.0,
            initial_yaw: -35.0,
            resume_delay_secs: 1.2,
            max_frame_delta_secs: 0.1,
            wrapper_open_offset: 140.0,
            wrapper_open_tilt: 15.0,
            sheen_min: 0.3,
            sheen_max: 1.0,
            base_scene_width: 520.0,
            base_scene_height: 420.0,
            min_scale: 0.55,
        }
    }
}

impl ControllerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded controller config from {}", path.display());
        Ok(config)
    }

    /// Render the effective configuration as a TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("unwrap_rate", self.unwrap_rate),
            ("wrap_rate", self.wrap_rate),
            ("pitch_rate", self.pitch_rate),
            ("max_frame_delta_secs", self.max_frame_delta_secs),
            ("base_scene_width", self.base_scene_width),
            ("base_scene_height", self.base_scene_height),
            ("min_scale", self.min_scale),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        let finite = [
            ("drag_sensitivity", self.drag_sensitivity),
            ("auto_rotation_speed", self.auto_rotation_speed),
            ("wrapped_pitch", self.wrapped_pitch),
            ("unwrapped_pitch", self.unwrapped_pitch),
            ("initial_pitch", self.initial_pitch),
            ("initial_yaw", self.initial_yaw),
            ("wrapper_open_offset", self.wrapper_open_offset),
            ("wrapper_open_tilt", self.wrapper_open_tilt),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(Error::InvalidConfig(format!("{name} must be finite")));
            }
        }

        if !self.resume_delay_secs.is_finite() || self.resume_delay_secs < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "resume_delay_secs must be >= 0, got {}",
                self.resume_delay_secs
            )));
        }

        for (name, value) in [("sheen_min", self.sheen_min), ("sheen_max", self.sheen_max)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.unwrap_rate > config.wrap_rate);
    }

    #[test]
    fn test_effective_config_reloads() {
        let mut config = ControllerConfig::default();
        config.resume_delay_secs = 2.5;
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("resume_delay_secs = 2.5"));
        assert_eq!(ControllerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ControllerConfig::from_toml_str(
            "drag_sensitivity = 0.5\nresume_delay_secs = 2.0\n",
        )
        .unwrap();
        assert_eq!(config.drag_sensitivity, 0.5);
        assert_eq!(config.resume_delay_secs, 2.0);
        assert_eq!(config.auto_rotation_speed, 14.5);
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        let err = ControllerConfig::from_toml_str("wrap_rate = 0.0").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("wrap_rate"));
    }

    #[test]
    fn test_rejects_sheen_out_of_range() {
        let err = ControllerConfig::from_toml_str("sheen_max = 1.5").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = ControllerConfig::from_toml_str("drag_sensitivity = \"fast\"").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ControllerConfig::load("/nonexistent/wrapspin.toml").unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
