//! Player preferences
//!
//! Visual effect toggles, audio levels and accessibility switches. Loaded from
//! JSON by the host; nothing is written back.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, check_range};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles drawn per frame
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 60,
            QualityPreset::Medium => 300,
            QualityPreset::High => 1000,
        }
    }

    /// Fraction of the ship trail drawn (1.0 = full)
    pub fn trail_quality(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.25,
            QualityPreset::Medium => 0.6,
            QualityPreset::High => 1.0,
        }
    }

    /// Whether to draw the parallax starfield
    pub fn starfield_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }

    /// Segments used for circles
    pub fn circle_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 10,
            QualityPreset::Medium => 18,
            QualityPreset::High => 32,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Screen shake on impacts
    pub screen_shake: bool,
    /// Ship engine trail
    pub trails: bool,
    /// Particle bursts
    pub particles: bool,
    /// Full-screen tint on correct/wrong hits
    pub feedback_flash: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            screen_shake: true,
            trails: true,
            particles: true,
            feedback_flash: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low drops the trail entirely
        if preset == QualityPreset::Low {
            self.trails = false;
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective feedback flash (respects reduced_motion)
    pub fn effective_feedback_flash(&self) -> bool {
        self.feedback_flash && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Gain applied to sound effects, zero when muted
    pub fn effective_sfx_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and validate a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("master_volume", self.master_volume, 0.0, 1.0, "0 <= x <= 1")?;
        check_range("sfx_volume", self.sfx_volume, 0.0, 1.0, "0 <= x <= 1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_overrides_effects() {
        let mut settings = Settings::default();
        assert!(settings.effective_screen_shake());
        assert!(settings.effective_feedback_flash());
        settings.reduced_motion = true;
        assert!(!settings.effective_screen_shake());
        assert!(!settings.effective_feedback_flash());
    }

    #[test]
    fn test_low_preset() {
        let settings = Settings::from_preset(QualityPreset::Low);
        assert!(!settings.trails);
        assert!(!settings.quality.starfield_enabled());
        assert_eq!(settings.max_particles(), 60);
    }

    #[test]
    fn test_particles_off_caps_to_zero() {
        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_muted_gain() {
        let mut settings = Settings::default();
        assert!((settings.effective_sfx_gain() - 0.8).abs() < 1e-6);
        settings.muted = true;
        assert_eq!(settings.effective_sfx_gain(), 0.0);
    }

    #[test]
    fn test_from_json() {
        let settings = Settings::from_json(r#"{ "quality": "High", "muted": true }"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert!(settings.muted);
        assert!(settings.trails);

        let err = Settings::from_json(r#"{ "sfx_volume": 3.0 }"#).unwrap_err();
        assert!(err.to_string().contains("sfx_volume"));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Settings::from_file("/nonexistent/settings.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_parse_preset() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
    }
}
