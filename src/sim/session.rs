//! Session state machine
//!
//! `Menu -> Playing -> GameOver -> Playing ...`. The session owns every piece
//! of mutable game state; `tick` is the only thing that advances it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::problem::{MathProblem, ProblemGenerator};
use super::state::{
    DAMAGE_SHAKE, EntityStore, FEEDBACK_TICKS, Feedback, FeedbackKind, GameEvent, GameStatus,
    Playfield, palette,
};
use crate::consts::*;
use crate::difficulty_for_score;
use crate::tuning::Tuning;

/// Per-session hit counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Bullets that hit the answer
    pub correct_hits: u32,
    /// Bullets that hit a distractor
    pub wrong_hits: u32,
    /// Ship collisions
    pub ship_hits: u32,
}

impl SessionStats {
    pub fn answered(&self) -> u32 {
        self.correct_hits + self.wrong_hits
    }

    /// Share of shot answers that were correct, `None` before the first one
    pub fn accuracy_percent(&self) -> Option<f32> {
        let total = self.answered();
        if total == 0 {
            None
        } else {
            Some(self.correct_hits as f32 * 100.0 / total as f32)
        }
    }
}

/// One playthrough's worth of state
#[derive(Debug, Clone)]
pub struct GameSession {
    pub status: GameStatus,
    pub score: u32,
    pub lives: u8,
    pub problem: Option<MathProblem>,
    /// Problems generated this session, including the first
    pub problems_generated: u32,

    pub store: EntityStore,
    pub generator: ProblemGenerator,
    pub field: Playfield,
    pub tuning: Tuning,

    /// Current shake magnitude (pixels)
    pub screen_shake: f32,
    pub feedback: Option<Feedback>,
    /// Ticks simulated while playing
    pub time_ticks: u64,
    /// Simulated milliseconds while playing
    pub elapsed_ms: f64,
    pub last_spawn_ms: f64,
    /// Remaining triple-shot ticks
    pub triple_shot_ticks: u32,
    /// Score at which the next boss appears, `None` when bosses are off
    pub next_boss_score: Option<u32>,
    pub stats: SessionStats,

    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    seed: u64,
}

impl GameSession {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self::with_generator(seed, tuning, ProblemGenerator::default())
    }

    pub fn with_generator(seed: u64, tuning: Tuning, generator: ProblemGenerator) -> Self {
        let field = Playfield::new(tuning.width, tuning.height);
        let next_boss_score = tuning.boss.next_threshold(0);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut store = EntityStore::new(&field);
        // Stars drift behind the menu too
        store.seed_stars(&mut rng, &field);

        Self {
            status: GameStatus::Menu,
            score: 0,
            lives: STARTING_LIVES,
            problem: None,
            problems_generated: 0,
            store,
            generator,
            field,
            tuning,
            screen_shake: 0.0,
            feedback: None,
            time_ticks: 0,
            elapsed_ms: 0.0,
            last_spawn_ms: 0.0,
            triple_shot_ticks: 0,
            next_boss_score,
            stats: SessionStats::default(),
            events: Vec::new(),
            rng,
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Current difficulty level (from score)
    pub fn difficulty(&self) -> u32 {
        difficulty_for_score(self.score)
    }

    /// Menu -> Playing. Ignored from any other status.
    pub fn start(&mut self) -> bool {
        if self.status != GameStatus::Menu {
            log::warn!("start() ignored in {:?}", self.status);
            return false;
        }
        self.reset();
        true
    }

    /// GameOver -> Playing. Ignored from any other status.
    pub fn restart(&mut self) -> bool {
        if self.status != GameStatus::GameOver {
            log::warn!("restart() ignored in {:?}", self.status);
            return false;
        }
        self.reset();
        true
    }

    fn reset(&mut self) {
        self.status = GameStatus::Playing;
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.problems_generated = 0;
        self.screen_shake = 0.0;
        self.feedback = None;
        self.time_ticks = 0;
        self.elapsed_ms = 0.0;
        self.last_spawn_ms = 0.0;
        self.triple_shot_ticks = 0;
        self.next_boss_score = self.tuning.boss.next_threshold(0);
        self.stats = SessionStats::default();
        self.events.clear();

        self.store = EntityStore::new(&self.field);
        self.store.seed_stars(&mut self.rng, &self.field);
        self.next_problem();

        log::info!(
            "Session started ({}x{}, seed {})",
            self.field.width,
            self.field.height,
            self.seed
        );
    }

    /// Replace the current problem using the difficulty for the current score
    pub(crate) fn next_problem(&mut self) {
        let problem = self.generator.generate(self.difficulty(), &mut self.rng);
        log::info!(
            "Problem #{} (difficulty {}): {} = {}",
            self.problems_generated + 1,
            self.difficulty(),
            problem.question,
            problem.answer
        );
        self.problems_generated += 1;
        self.events.push(GameEvent::ProblemChanged {
            question: problem.question.clone(),
        });
        self.problem = Some(problem);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Random float in [0, 1) from the session RNG
    pub(crate) fn roll(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    pub(crate) fn burst(&mut self, pos: Vec2, colors: &[[f32; 4]], count: usize) {
        self.store.spawn_burst(&mut self.rng, pos, colors, count);
    }

    pub(crate) fn flash(&mut self, kind: FeedbackKind) {
        self.feedback = Some(Feedback {
            kind,
            ticks_left: FEEDBACK_TICKS,
        });
    }

    /// Explosion, shake and a lost life at `pos`
    pub(crate) fn take_damage(&mut self, pos: Vec2) {
        self.burst(pos, &palette::EXPLOSION, self.tuning.particle_count);
        self.screen_shake = DAMAGE_SHAKE;
        self.lose_life();
    }

    /// Decrement lives; the session ends exactly when they reach zero.
    pub(crate) fn lose_life(&mut self) {
        if self.status != GameStatus::Playing {
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.status = GameStatus::GameOver;
            self.events.push(GameEvent::GameOver { score: self.score });
            log::info!(
                "Game over: score {} after {} ticks ({} correct, {} wrong)",
                self.score,
                self.time_ticks,
                self.stats.correct_hits,
                self.stats.wrong_hits
            );
        }
    }

    pub(crate) fn gain_life(&mut self) {
        self.lives = (self.lives + 1).min(MAX_LIVES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_in_menu() {
        let session = GameSession::new(1, Tuning::default());
        assert_eq!(session.status, GameStatus::Menu);
        assert!(session.problem.is_none());
        assert_eq!(session.store.stars.len(), 230);
    }

    #[test]
    fn test_start_resets() {
        let mut session = GameSession::new(1, Tuning::default());
        assert!(session.start());
        assert_eq!(session.status, GameStatus::Playing);
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, 3);
        assert!(session.problem.is_some());
        assert_eq!(session.problems_generated, 1);
        assert_eq!(session.store.ship.pos, Vec2::new(400.0, 500.0));
        assert!(matches!(
            session.events.last(),
            Some(GameEvent::ProblemChanged { .. })
        ));
    }

    #[test]
    fn test_invalid_transitions_are_ignored() {
        let mut session = GameSession::new(1, Tuning::default());
        assert!(!session.restart());
        assert_eq!(session.status, GameStatus::Menu);

        session.start();
        assert!(!session.start());
        assert!(!session.restart());
        assert_eq!(session.status, GameStatus::Playing);
    }

    #[test]
    fn test_lives_saturate_and_end_session() {
        let mut session = GameSession::new(1, Tuning::default());
        session.start();
        for _ in 0..5 {
            session.lose_life();
        }
        assert_eq!(session.lives, 0);
        assert_eq!(session.status, GameStatus::GameOver);
        let game_overs = session
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);

        assert!(session.restart());
        assert_eq!(session.lives, 3);
        assert!(session.store.enemies.is_empty());
    }

    #[test]
    fn test_gain_life_capped() {
        let mut session = GameSession::new(1, Tuning::default());
        session.start();
        for _ in 0..4 {
            session.gain_life();
        }
        assert_eq!(session.lives, MAX_LIVES);
    }

    #[test]
    fn test_accuracy_guards_zero() {
        let mut stats = SessionStats::default();
        assert_eq!(stats.accuracy_percent(), None);
        stats.correct_hits = 3;
        stats.wrong_hits = 1;
        assert_eq!(stats.accuracy_percent(), Some(75.0));
    }
}
