//! Data-driven game balance
//!
//! Every gameplay constant that shapes difficulty lives here so it can be
//! tweaked from JSON without a rebuild. Defaults reproduce the shipped game.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use crate::error::{ConfigError, check_range};
use crate::sim::state::EnemyKind;

/// Per-kind enemy parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyProfile {
    /// Descent speed range (pixels per tick)
    pub speed_min: f32,
    pub speed_max: f32,
    /// Radius range; equal bounds give a fixed size
    pub radius_min: f32,
    pub radius_max: f32,
    /// Relative spawn weight
    pub weight: f32,
    /// Horizontal oscillation (pixels); zero disables
    pub sway_amplitude: f32,
    /// Oscillation angular speed (radians per tick)
    pub sway_frequency: f32,
    /// Spin range; rotation speed is drawn from +-spin/2
    pub spin: f32,
}

impl EnemyProfile {
    pub const ASTEROID: Self = Self {
        speed_min: 1.5,
        speed_max: 3.0,
        radius_min: 30.0,
        radius_max: 45.0,
        weight: 60.0,
        sway_amplitude: 0.0,
        sway_frequency: 0.0,
        spin: 0.05,
    };

    pub const SCOUT: Self = Self {
        speed_min: 4.0,
        speed_max: 6.0,
        radius_min: 25.0,
        radius_max: 25.0,
        weight: 25.0,
        sway_amplitude: 60.0,
        sway_frequency: 0.05,
        spin: 0.0,
    };

    pub const HEAVY: Self = Self {
        speed_min: 0.5,
        speed_max: 1.2,
        radius_min: 55.0,
        radius_max: 55.0,
        weight: 15.0,
        sway_amplitude: 10.0,
        sway_frequency: 0.02,
        spin: 0.0,
    };

    fn validate(&self, kind: EnemyKind) -> Result<(), ConfigError> {
        let field = match kind {
            EnemyKind::Asteroid => "asteroid",
            EnemyKind::Scout => "scout",
            EnemyKind::Heavy => "heavy",
        };
        check_range(field, self.speed_min, 0.0, 100.0, "0 <= speed_min <= 100")?;
        check_range(field, self.speed_max, self.speed_min, 100.0, "speed_min <= speed_max <= 100")?;
        check_range(field, self.radius_min, 1.0, 200.0, "1 <= radius_min <= 200")?;
        check_range(field, self.radius_max, self.radius_min, 200.0, "radius_min <= radius_max <= 200")?;
        check_range(field, self.weight, 0.0, 1000.0, "0 <= weight <= 1000")?;
        check_range(field, self.sway_amplitude, 0.0, 1000.0, "0 <= sway_amplitude")?;
        check_range(field, self.sway_frequency, 0.0, 10.0, "0 <= sway_frequency <= 10")?;
        check_range(field, self.spin, 0.0, 1.0, "0 <= spin <= 1")
    }
}

/// Mothership encounter parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossProfile {
    /// A boss appears each time the score reaches a multiple of this; zero disables
    pub score_interval: u32,
    pub base_health: u32,
    /// Extra health per completed interval
    pub health_per_level: u32,
    /// Score awarded for the kill
    pub bonus: u32,
    pub radius: f32,
    /// Horizontal patrol speed (pixels per tick)
    pub speed: f32,
    /// Descent speed while entering
    pub entry_speed: f32,
    /// Patrol height
    pub hover_y: f32,
    pub bob_amplitude: f32,
    pub bob_frequency: f32,
    /// Patrol turns around this far from either edge
    pub edge_margin: f32,
}

impl Default for BossProfile {
    fn default() -> Self {
        Self {
            score_interval: 500,
            base_health: 20,
            health_per_level: 10,
            bonus: 500,
            radius: 60.0,
            speed: 3.0,
            entry_speed: 2.0,
            hover_y: 100.0,
            bob_amplitude: 20.0,
            bob_frequency: 0.05,
            edge_margin: 100.0,
        }
    }
}

impl BossProfile {
    /// Starting health for a boss summoned at `score`
    pub fn health_at(&self, score: u32) -> u32 {
        let level = score.checked_div(self.score_interval).unwrap_or(0);
        self.base_health
            .saturating_add(level.saturating_mul(self.health_per_level))
            .max(1)
    }

    /// First boss threshold strictly above `score`, `None` when bosses are off
    pub fn next_threshold(&self, score: u32) -> Option<u32> {
        let level = score.checked_div(self.score_interval)?;
        (level + 1).checked_mul(self.score_interval)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_range("boss", self.radius, 1.0, 500.0, "1 <= radius <= 500")?;
        check_range("boss", self.speed, 0.0, 100.0, "0 <= speed <= 100")?;
        check_range("boss", self.entry_speed, 0.1, 100.0, "0.1 <= entry_speed <= 100")?;
        check_range("boss", self.bob_frequency, 0.0, 10.0, "0 <= bob_frequency <= 10")?;
        check_range("boss", self.edge_margin, 0.0, 5000.0, "0 <= edge_margin")
    }
}

/// Gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Playfield size (pixels)
    pub width: f32,
    pub height: f32,

    /// Keyboard movement per tick (pixels)
    pub ship_speed: f32,
    /// Pointer smoothing factor (0-1]
    pub ship_lerp: f32,
    /// Bullet speed (pixels per tick)
    pub bullet_speed: f32,
    /// Ticks between autofire volleys
    pub fire_cooldown_ticks: u32,
    /// Horizontal spacing of triple-shot side bullets
    pub triple_shot_spread: f32,

    /// Milliseconds between enemy spawns
    pub spawn_interval_ms: f32,
    /// Base chance that a spawn carries the answer
    pub base_correct_chance: f32,
    /// Chance to force a correct spawn when none is on the field
    pub force_correct_chance: f32,

    pub asteroid: EnemyProfile,
    pub scout: EnemyProfile,
    pub heavy: EnemyProfile,

    /// Particles per explosion / success burst
    pub particle_count: usize,
    /// Particle life lost per tick
    pub particle_decay: f32,
    /// Ship trail samples kept
    pub trail_length: usize,

    /// Drop chance on a correct hit; zero disables power-ups
    pub power_up_chance: f32,
    /// Duration of triple shot
    pub triple_shot_ticks: u32,

    pub boss: BossProfile,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
            ship_speed: 8.0,
            ship_lerp: 0.1,
            bullet_speed: 15.0,
            fire_cooldown_ticks: 12,
            triple_shot_spread: 12.0,
            spawn_interval_ms: 1200.0,
            base_correct_chance: 0.4,
            force_correct_chance: 0.7,
            asteroid: EnemyProfile::ASTEROID,
            scout: EnemyProfile::SCOUT,
            heavy: EnemyProfile::HEAVY,
            particle_count: 20,
            particle_decay: 0.03,
            trail_length: 20,
            power_up_chance: 0.15,
            triple_shot_ticks: 600,
            boss: BossProfile::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON document. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read and validate a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn profile(&self, kind: EnemyKind) -> &EnemyProfile {
        match kind {
            EnemyKind::Asteroid => &self.asteroid,
            EnemyKind::Scout => &self.scout,
            EnemyKind::Heavy => &self.heavy,
        }
    }

    /// Sum of all spawn weights
    pub fn total_weight(&self) -> f32 {
        EnemyKind::ALL.iter().map(|k| self.profile(*k).weight).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("width", self.width, 80.0, 10_000.0, "80 <= width <= 10000")?;
        check_range("height", self.height, 160.0, 10_000.0, "160 <= height <= 10000")?;
        check_range("ship_speed", self.ship_speed, 0.0, 100.0, "0 <= x <= 100")?;
        if !(self.ship_lerp > 0.0 && self.ship_lerp <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "ship_lerp",
                value: self.ship_lerp,
                expected: "0 < x <= 1",
            });
        }
        check_range("bullet_speed", self.bullet_speed, 1.0, 200.0, "1 <= x <= 200")?;
        check_range(
            "fire_cooldown_ticks",
            self.fire_cooldown_ticks as f32,
            1.0,
            600.0,
            "1 <= x <= 600",
        )?;
        check_range("triple_shot_spread", self.triple_shot_spread, 0.0, 100.0, "0 <= x <= 100")?;
        check_range("spawn_interval_ms", self.spawn_interval_ms, 16.0, 60_000.0, "16 <= x <= 60000")?;
        check_range("base_correct_chance", self.base_correct_chance, 0.0, 1.0, "0 <= x <= 1")?;
        check_range("force_correct_chance", self.force_correct_chance, 0.0, 1.0, "0 <= x <= 1")?;
        check_range("particle_decay", self.particle_decay, 0.001, 1.0, "0.001 <= x <= 1")?;
        check_range("power_up_chance", self.power_up_chance, 0.0, 1.0, "0 <= x <= 1")?;

        for kind in EnemyKind::ALL {
            self.profile(kind).validate(kind)?;
        }
        self.boss.validate()?;
        if self.total_weight() <= 0.0 {
            return Err(ConfigError::Empty {
                field: "enemy weights",
            });
        }
        if self.trail_length == 0 {
            return Err(ConfigError::Empty {
                field: "trail_length",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.total_weight(), 100.0);
        assert_eq!(tuning.profile(EnemyKind::Heavy).radius_min, 55.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "spawn_interval_ms": 600.0 }"#).unwrap();
        assert_eq!(tuning.spawn_interval_ms, 600.0);
        assert_eq!(tuning.bullet_speed, 15.0);
    }

    #[test]
    fn test_rejects_bad_lerp() {
        let err = Tuning::from_json(r#"{ "ship_lerp": 0.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "ship_lerp",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_zero_weights() {
        let mut tuning = Tuning::default();
        tuning.asteroid.weight = 0.0;
        tuning.scout.weight = 0.0;
        tuning.heavy.weight = 0.0;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::Empty { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_boss_health_and_thresholds() {
        let boss = BossProfile::default();
        assert_eq!(boss.health_at(500), 30);
        assert_eq!(boss.health_at(1490), 40);
        assert_eq!(boss.next_threshold(0), Some(500));
        assert_eq!(boss.next_threshold(1000), Some(1500));

        let off = BossProfile {
            score_interval: 0,
            ..BossProfile::default()
        };
        assert_eq!(off.next_threshold(0), None);
        assert_eq!(off.health_at(900), 20);
    }

    #[test]
    fn test_partial_boss_json() {
        let tuning = Tuning::from_json(r#"{ "boss": { "bonus": 250 } }"#).unwrap();
        assert_eq!(tuning.boss.bonus, 250);
        assert_eq!(tuning.boss.score_interval, 500);
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join("math_defender_tuning_test.json");
        std::fs::write(&path, r#"{ "bullet_speed": 20.0 }"#).unwrap();
        let tuning = Tuning::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(tuning.bullet_speed, 20.0);

        assert!(matches!(
            Tuning::from_file("/nonexistent/math_defender.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_preserves_profiles() {
        let mut tuning = Tuning::default();
        tuning.scout.sway_amplitude = 80.0;
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }
}
