//! Math Defender - an arcade shooter for mental arithmetic
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, session state)
//! - `renderer`: Frame tessellation and the WebGPU pipeline that presents it
//! - `audio`: Sound cue contract and the Web Audio backend
//! - `game`: Host-agnostic driver tying clock, input, audio and rendering together
//! - `settings` / `tuning`: Player preferences and data-driven game balance

pub mod audio;
pub mod error;
pub mod game;
pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, RenderError};
pub use game::Game;
pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz display refresh)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Default playfield dimensions (pixels)
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Ship geometry
    pub const SHIP_RADIUS: f32 = 20.0;
    pub const SHIP_SIZE: f32 = 40.0;
    /// Distance of the ship's center above the bottom edge
    pub const SHIP_BOTTOM_OFFSET: f32 = 100.0;

    pub const BULLET_RADIUS: f32 = 3.0;

    pub const STARTING_LIVES: u8 = 3;
    /// Shield pickups never push lives past this
    pub const MAX_LIVES: u8 = 5;
    pub const POINTS_PER_CORRECT: u32 = 10;
    pub const POINTS_PER_NUKE: u32 = 50;
    /// Score needed per difficulty step
    pub const SCORE_PER_DIFFICULTY: u32 = 50;

    /// Enemies are culled this far below the bottom edge
    pub const OFFSCREEN_MARGIN: f32 = 50.0;
}

/// Euclidean distance test used by every collision check: overlap is strict.
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Difficulty level for a given score (1-based)
#[inline]
pub fn difficulty_for_score(score: u32) -> u32 {
    score / consts::SCORE_PER_DIFFICULTY + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circles_overlap_is_strict() {
        let a = Vec2::new(0.0, 0.0);
        assert!(circles_overlap(a, 5.0, Vec2::new(9.9, 0.0), 5.0));
        assert!(!circles_overlap(a, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(!circles_overlap(a, 5.0, Vec2::new(30.0, 30.0), 5.0));
    }

    #[test]
    fn test_difficulty_for_score() {
        assert_eq!(difficulty_for_score(0), 1);
        assert_eq!(difficulty_for_score(49), 1);
        assert_eq!(difficulty_for_score(50), 2);
        assert_eq!(difficulty_for_score(120), 3);
    }
}
