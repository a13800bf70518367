//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (every draw goes through the session's `Pcg32`)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod problem;
pub mod session;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::{FixedStepClock, ManualClock, TickSource};
pub use collision::{
    HitResult, resolve_bullet_boss, resolve_bullet_enemies, resolve_power_ups, resolve_ship_enemies,
};
pub use problem::{MathProblem, Operator, ProblemGenerator, generate_distractor, generate_problem};
pub use session::{GameSession, SessionStats};
pub use spawn::{decide_correct, pick_kind, spawn_enemy};
pub use state::{
    Boss, Bullet, Enemy, EnemyKind, EntityStore, Feedback, FeedbackKind, GameEvent, GameStatus,
    Particle, Playfield, PowerUp, PowerUpKind, Ship, Star,
};
pub use tick::{TickInput, tick};
