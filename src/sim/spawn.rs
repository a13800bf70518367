//! Enemy spawn policy
//!
//! Picks the kind by weight, decides whether the newcomer carries the answer
//! and places it just above the top edge.

use glam::Vec2;
use rand::Rng;

use super::problem::{MathProblem, generate_distractor};
use super::state::{Enemy, EnemyKind, EntityStore, Playfield};
use crate::tuning::Tuning;

/// Weighted kind selection by cumulative threshold
pub fn pick_kind<R: Rng + ?Sized>(rng: &mut R, tuning: &Tuning) -> EnemyKind {
    let roll = rng.random::<f32>() * tuning.total_weight();
    let mut cumulative = 0.0;
    for kind in EnemyKind::ALL {
        let weight = tuning.profile(kind).weight;
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        if roll < cumulative {
            return kind;
        }
    }
    // Float rounding at the top of the range; fall back to the last weighted kind
    EnemyKind::ALL
        .into_iter()
        .rev()
        .find(|k| tuning.profile(*k).weight > 0.0)
        .unwrap_or(EnemyKind::Asteroid)
}

/// Whether the next spawn carries the correct answer.
///
/// With no correct enemy on the field a second draw can force it.
pub fn decide_correct<R: Rng + ?Sized>(
    rng: &mut R,
    has_correct_active: bool,
    tuning: &Tuning,
) -> bool {
    let base = rng.random::<f32>() < tuning.base_correct_chance;
    let forced = !has_correct_active && rng.random::<f32>() < tuning.force_correct_chance;
    forced || base
}

fn draw<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min)
}

/// Create one enemy for `problem` and add it to the store. Returns its ID.
pub fn spawn_enemy<R: Rng + ?Sized>(
    rng: &mut R,
    store: &mut EntityStore,
    problem: &MathProblem,
    field: &Playfield,
    tuning: &Tuning,
) -> u32 {
    let kind = pick_kind(rng, tuning);
    let is_correct = decide_correct(rng, store.has_correct_enemy(), tuning);
    let value = if is_correct {
        problem.answer
    } else {
        generate_distractor(problem.answer, rng)
    };

    let profile = tuning.profile(kind);
    let radius = draw(rng, profile.radius_min, profile.radius_max);
    let speed = draw(rng, profile.speed_min, profile.speed_max);
    let x = draw(rng, radius, (field.width - radius).max(radius));
    let rotation_speed = (rng.random::<f32>() - 0.5) * profile.spin;
    let phase = rng.random::<f32>() * 1000.0;

    let id = store.next_entity_id();
    store.enemies.push(Enemy {
        id,
        kind,
        pos: Vec2::new(x, -radius * 2.0),
        vel: Vec2::new(0.0, speed),
        radius,
        angle: 0.0,
        rotation_speed,
        origin_x: x,
        phase,
        value,
        is_correct,
        active: true,
    });

    log::debug!(
        "Spawned {} #{} value={} correct={} at x={:.0}",
        kind.as_str(),
        id,
        value,
        is_correct,
        x
    );
    id
}
