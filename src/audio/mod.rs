//! Sound cue contract
//!
//! The simulation never talks to audio directly. The driver maps drained
//! `GameEvent`s to `SoundEffect`s and hands them to an `AudioSink`.

use serde::{Deserialize, Serialize};

use crate::sim::{GameEvent, GameStatus};

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Autofire volley
    Shoot,
    /// Correct answer hit
    Correct,
    /// Wrong answer hit
    Wrong,
    /// Something blew up (ship collision or wrong answer)
    Explosion,
    /// Lives ran out
    GameOver,
    /// Power-up collected
    PowerUp,
}

/// Background music selection, follows the session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicTrack {
    Menu,
    Playing,
    GameOver,
}

impl From<GameStatus> for MusicTrack {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::Menu => MusicTrack::Menu,
            GameStatus::Playing => MusicTrack::Playing,
            GameStatus::GameOver => MusicTrack::GameOver,
        }
    }
}

/// Cues triggered by a simulation event
pub fn cues_for(event: &GameEvent) -> &'static [SoundEffect] {
    match event {
        GameEvent::Shot => &[SoundEffect::Shoot],
        GameEvent::CorrectHit { .. } => &[SoundEffect::Correct],
        GameEvent::WrongHit { .. } => &[SoundEffect::Wrong, SoundEffect::Explosion],
        GameEvent::ShipHit => &[SoundEffect::Explosion],
        GameEvent::PowerUpCollected(_) => &[SoundEffect::PowerUp],
        GameEvent::BossDefeated { .. } => &[SoundEffect::Correct],
        GameEvent::GameOver { .. } => &[SoundEffect::GameOver],
        GameEvent::ProblemChanged { .. }
        | GameEvent::BossSpawned { .. }
        | GameEvent::BossHit { .. } => &[],
    }
}

/// Fire-and-forget audio output
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
    fn set_music(&mut self, track: MusicTrack);
    fn set_muted(&mut self, muted: bool);
    fn is_muted(&self) -> bool;
}

/// Discards everything (headless runs)
#[derive(Debug, Default)]
pub struct SilentAudio {
    muted: bool,
}

impl AudioSink for SilentAudio {
    fn play(&mut self, _effect: SoundEffect) {}

    fn set_music(&mut self, _track: MusicTrack) {}

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

/// Remembers what it was asked to play
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub played: Vec<SoundEffect>,
    pub tracks: Vec<MusicTrack>,
    muted: bool,
}

impl RecordingAudio {
    pub fn count(&self, effect: SoundEffect) -> usize {
        self.played.iter().filter(|e| **e == effect).count()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, effect: SoundEffect) {
        if !self.muted {
            self.played.push(effect);
        }
    }

    fn set_music(&mut self, track: MusicTrack) {
        self.tracks.push(track);
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::PowerUpKind;

    #[test]
    fn test_event_cues() {
        assert_eq!(cues_for(&GameEvent::Shot), &[SoundEffect::Shoot]);
        assert_eq!(
            cues_for(&GameEvent::WrongHit { value: 4 }),
            &[SoundEffect::Wrong, SoundEffect::Explosion]
        );
        assert_eq!(
            cues_for(&GameEvent::PowerUpCollected(PowerUpKind::Nuke)),
            &[SoundEffect::PowerUp]
        );
        assert_eq!(
            cues_for(&GameEvent::BossDefeated { bonus: 500 }),
            &[SoundEffect::Correct]
        );
        assert!(cues_for(&GameEvent::BossHit { health_left: 3 }).is_empty());
        assert!(
            cues_for(&GameEvent::ProblemChanged {
                question: "2 + 2".into()
            })
            .is_empty()
        );
    }

    #[test]
    fn test_recording_respects_mute() {
        let mut audio = RecordingAudio::default();
        audio.play(SoundEffect::Shoot);
        audio.set_muted(true);
        audio.play(SoundEffect::Shoot);
        assert_eq!(audio.count(SoundEffect::Shoot), 1);
        assert!(audio.is_muted());
    }

    #[test]
    fn test_track_follows_status() {
        assert_eq!(MusicTrack::from(GameStatus::GameOver), MusicTrack::GameOver);
    }
}
