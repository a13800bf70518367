//! Host-agnostic game driver
//!
//! Owns the session, the tick clock, the latest input snapshot, the audio sink
//! and the leaderboard. A host calls `frame` once per display refresh.

use serde::Serialize;

use crate::audio::{AudioSink, MusicTrack, cues_for};
use crate::error::RenderError;
use crate::highscores::{HighScoreEntry, HighScores};
use crate::renderer::{FrameSink, build_frame};
use crate::settings::Settings;
use crate::sim::clock::{FixedStepClock, TickSource};
use crate::sim::{GameEvent, GameSession, GameStatus, Operator, ProblemGenerator, TickInput, tick};
use crate::tuning::Tuning;

/// What the HUD shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub status: GameStatus,
    pub score: u32,
    pub lives: u8,
    pub difficulty: u32,
    pub question: Option<String>,
    pub accuracy_percent: Option<f32>,
    pub high_score: Option<u32>,
    /// Enabled operator symbols, e.g. `"+ - x"`
    pub operators: String,
    /// Boss health in [0, 1] while one is on the field
    pub boss_health: Option<f32>,
}

pub struct Game<A: AudioSink, C: TickSource = FixedStepClock> {
    pub session: GameSession,
    /// Written by input handlers, read once per tick
    pub input: TickInput,
    pub settings: Settings,
    pub high_scores: HighScores,
    pub audio: A,
    clock: C,
    last_status: GameStatus,
    /// Leaderboard rank of the most recent finished run
    pub last_rank: Option<usize>,
}

impl<A: AudioSink> Game<A> {
    pub fn new(seed: u64, settings: Settings, tuning: Tuning, audio: A) -> Self {
        Self::with_clock(seed, settings, tuning, audio, FixedStepClock::default())
    }
}

impl<A: AudioSink, C: TickSource> Game<A, C> {
    pub fn with_clock(seed: u64, settings: Settings, tuning: Tuning, mut audio: A, clock: C) -> Self {
        audio.set_muted(settings.muted);
        audio.set_music(MusicTrack::Menu);
        Self {
            session: GameSession::new(seed, tuning),
            input: TickInput::default(),
            settings,
            high_scores: HighScores::new(),
            audio,
            clock,
            last_status: GameStatus::Menu,
            last_rank: None,
        }
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn start(&mut self) -> bool {
        let started = self.session.start();
        if started {
            self.clock.reset();
            self.last_rank = None;
            self.dispatch();
        }
        started
    }

    pub fn restart(&mut self) -> bool {
        let restarted = self.session.restart();
        if restarted {
            self.clock.reset();
            self.last_rank = None;
            self.dispatch();
        }
        restarted
    }

    /// Replace the operator set. Refused mid-run; takes effect with the next
    /// problem.
    pub fn set_generator(&mut self, generator: ProblemGenerator) -> bool {
        if self.session.is_playing() {
            log::warn!("Operator change ignored while playing");
            return false;
        }
        self.session.generator = generator;
        log::info!("Operators: {}", self.operator_symbols());
        true
    }

    /// Menu toggle for a single operator
    pub fn toggle_operator(&mut self, op: Operator) -> bool {
        let generator = self.session.generator.toggled(op);
        self.set_generator(generator)
    }

    fn operator_symbols(&self) -> String {
        self.session
            .generator
            .operators()
            .iter()
            .map(|op| op.symbol())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Flip mute on the sink and in settings. Returns the new state.
    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.audio.is_muted();
        self.audio.set_muted(muted);
        self.settings.muted = muted;
        log::info!("Audio {}", if muted { "muted" } else { "unmuted" });
        muted
    }

    /// Run the ticks due at `now_ms`, then dispatch audio. Returns ticks run.
    pub fn step(&mut self, now_ms: f64) -> u32 {
        let ticks = self.clock.advance(now_ms);
        let dt = self.clock.tick_ms();
        for _ in 0..ticks {
            tick(&mut self.session, &self.input, dt);
        }
        self.dispatch();
        ticks
    }

    /// One display refresh. Without a surface nothing advances.
    pub fn frame(
        &mut self,
        now_ms: f64,
        sink: Option<&mut dyn FrameSink>,
    ) -> Result<u32, RenderError> {
        let Some(sink) = sink else {
            return Ok(0);
        };
        let ticks = self.step(now_ms);
        let frame = build_frame(&self.session, &self.settings, (now_ms / 1000.0) as f32);
        sink.present(&frame)?;
        Ok(ticks)
    }

    pub fn hud(&self) -> Hud {
        Hud {
            status: self.session.status,
            score: self.session.score,
            lives: self.session.lives,
            difficulty: self.session.difficulty(),
            question: self.session.problem.as_ref().map(|p| p.question.clone()),
            accuracy_percent: self.session.stats.accuracy_percent(),
            high_score: self.high_scores.top_score(),
            operators: self.operator_symbols(),
            boss_health: self.session.store.boss.as_ref().map(|b| b.health_fraction()),
        }
    }

    /// Drain session events into audio and the leaderboard
    fn dispatch(&mut self) {
        for event in self.session.drain_events() {
            for cue in cues_for(&event) {
                self.audio.play(*cue);
            }
            if let GameEvent::GameOver { score } = event {
                self.record_score(score);
            }
        }

        if self.session.status != self.last_status {
            self.last_status = self.session.status;
            self.audio.set_music(self.last_status.into());
        }
    }

    fn record_score(&mut self, score: u32) {
        let entry = HighScoreEntry {
            score,
            difficulty: self.session.difficulty(),
            correct: self.session.stats.correct_hits,
            ticks: self.session.time_ticks,
        };
        self.last_rank = self.high_scores.add(entry);
        if let Some(rank) = self.last_rank {
            log::info!("High score #{}: {}", rank, score);
        }
    }
}
