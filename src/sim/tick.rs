//! Fixed timestep simulation tick
//!
//! Advances one session by one tick. The order of the steps below is part of
//! the game's contract: it decides which collisions win within a frame.

use glam::Vec2;
use rand::Rng;

use super::collision::{
    resolve_bullet_boss, resolve_bullet_enemies, resolve_power_ups, resolve_ship_enemies,
};
use super::session::GameSession;
use super::spawn::spawn_enemy;
use super::state::{Boss, Bullet, GameEvent, GameStatus, POWER_UP_FALL_SPEED};
use crate::consts::OFFSCREEN_MARGIN;

/// Shake below this snaps to zero
const SHAKE_EPSILON: f32 = 0.5;
/// Tilt per pixel of pointer lag
const TILT_PER_PIXEL: f32 = 0.02;
const MAX_TILT: f32 = 0.4;

/// Input snapshot for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Pointer x in playfield pixels, if the pointer is over the canvas
    pub pointer_x: Option<f32>,
    /// Move-left key held
    pub left: bool,
    /// Move-right key held
    pub right: bool,
    /// Idle/demo mode - the ship steers itself under the correct answer
    pub autopilot: bool,
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut GameSession, input: &TickInput, dt_ms: f32) {
    if session.status != GameStatus::Playing {
        return;
    }
    session.time_ticks += 1;
    session.elapsed_ms += dt_ms as f64;

    // 1. Decay screen shake and the feedback flash
    session.screen_shake *= 0.9;
    if session.screen_shake < SHAKE_EPSILON {
        session.screen_shake = 0.0;
    }
    if let Some(feedback) = session.feedback.as_mut() {
        feedback.ticks_left = feedback.ticks_left.saturating_sub(1);
        if feedback.ticks_left == 0 {
            session.feedback = None;
        }
    }

    // 2. Ship movement and trail
    let input = if input.autopilot {
        autopilot_input(session)
    } else {
        input.clone()
    };
    update_ship(session, &input);

    // 3. Autofire
    update_weapon(session);

    // 4. Bullets
    for bullet in &mut session.store.bullets {
        bullet.pos += bullet.vel;
        if bullet.pos.y < 0.0 {
            bullet.active = false;
        }
    }

    // 5. Boss: summon, move, take hits
    update_boss(session);

    // 6. Spawning
    if session.elapsed_ms - session.last_spawn_ms > session.tuning.spawn_interval_ms as f64 {
        let GameSession {
            problem,
            store,
            rng,
            field,
            tuning,
            ..
        } = session;
        if let Some(problem) = problem.as_ref() {
            spawn_enemy(rng, store, problem, field, tuning);
        }
        session.last_spawn_ms = session.elapsed_ms;
    }

    // 7. Enemies, then ship collisions
    let bottom = session.field.height + OFFSCREEN_MARGIN;
    for enemy in session.store.enemies.iter_mut().filter(|e| e.active) {
        enemy.advance(
            session.tuning.profile(enemy.kind),
            session.time_ticks,
            session.field.width,
        );
        if enemy.pos.y > bottom {
            enemy.active = false;
        }
    }
    resolve_ship_enemies(session);

    // 8. Bullets against enemies
    resolve_bullet_enemies(session);

    // Power-ups fall and may be picked up
    for power_up in &mut session.store.power_ups {
        power_up.pos.y += POWER_UP_FALL_SPEED;
        if power_up.pos.y > bottom {
            power_up.active = false;
        }
    }
    if session.status == GameStatus::Playing {
        resolve_power_ups(session);
    }

    // 9. Particles, then cull
    let decay = session.tuning.particle_decay;
    for particle in &mut session.store.particles {
        particle.pos += particle.vel;
        particle.life -= decay;
    }
    session.store.cull();

    // 10. Parallax stars
    update_stars(session);
}

fn update_ship(session: &mut GameSession, input: &TickInput) {
    let width = session.field.width;
    let tuning = &session.tuning;
    let ship = &mut session.store.ship;
    let start_x = ship.pos.x;

    // Pointer only counts while it is inside the playfield
    let target = match input.pointer_x {
        Some(x) if x > 0.0 && x < width => x,
        _ => ship.pos.x,
    };
    let diff = target - ship.pos.x;
    ship.pos.x += diff * tuning.ship_lerp;
    ship.tilt = (diff * TILT_PER_PIXEL).clamp(-MAX_TILT, MAX_TILT);

    if input.left {
        ship.pos.x -= tuning.ship_speed;
    }
    if input.right {
        ship.pos.x += tuning.ship_speed;
    }
    ship.pos.x = ship.pos.x.max(ship.radius).min(width - ship.radius);
    ship.vel = Vec2::new(ship.pos.x - start_x, 0.0);

    ship.record_trail(tuning.trail_length);
}

fn update_weapon(session: &mut GameSession) {
    if session.triple_shot_ticks > 0 {
        session.triple_shot_ticks -= 1;
    }

    let ship = &mut session.store.ship;
    ship.cooldown = ship.cooldown.saturating_sub(1);
    if ship.cooldown > 0 {
        return;
    }
    ship.cooldown = session.tuning.fire_cooldown_ticks;

    let muzzle = ship.muzzle();
    let speed = session.tuning.bullet_speed;
    session.store.bullets.push(Bullet::new(muzzle, speed));
    if session.triple_shot_ticks > 0 {
        let spread = Vec2::new(session.tuning.triple_shot_spread, 0.0);
        session.store.bullets.push(Bullet::new(muzzle - spread, speed));
        session.store.bullets.push(Bullet::new(muzzle + spread, speed));
    }
    session.events.push(GameEvent::Shot);
}

fn update_boss(session: &mut GameSession) {
    let profile = session.tuning.boss;
    if session.store.boss.is_none()
        && let Some(threshold) = session.next_boss_score
        && session.score >= threshold
    {
        let health = profile.health_at(session.score);
        session.store.boss = Some(Boss::new(&session.field, &profile, health));
        session.next_boss_score = profile.next_threshold(session.score);
        session.events.push(GameEvent::BossSpawned { health });
        log::info!("Boss incoming at score {} with {} health", session.score, health);
    }

    if let Some(boss) = session.store.boss.as_mut() {
        boss.advance(&profile, session.time_ticks, session.field.width);
    }
    resolve_bullet_boss(session);
}

fn update_stars(session: &mut GameSession) {
    let GameSession {
        store, rng, field, ..
    } = session;
    for star in &mut store.stars {
        star.pos.y += star.speed;
        if star.pos.y > field.height {
            star.pos.y = 0.0;
            star.pos.x = rng.random::<f32>() * field.width;
        }
    }
}

/// Demo-mode steering: chase the lowest correct enemy, otherwise sidestep
/// whatever is coming down on the ship.
fn autopilot_input(session: &GameSession) -> TickInput {
    let ship = &session.store.ship;
    let target = session
        .store
        .active_enemies()
        .filter(|e| e.is_correct && e.pos.y < ship.pos.y - ship.radius)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|e| e.pos.x);

    let target = target.or_else(|| {
        // Sidestep the nearest wrong enemy above the ship
        session
            .store
            .active_enemies()
            .filter(|e| !e.is_correct && (e.pos.x - ship.pos.x).abs() < e.radius + ship.radius)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|e| {
                if e.pos.x > session.field.width / 2.0 {
                    e.pos.x - e.radius * 3.0
                } else {
                    e.pos.x + e.radius * 3.0
                }
            })
    });

    // Nothing better to do: work on the boss
    let target = target.or_else(|| session.store.boss.as_ref().map(|b| b.pos.x));

    TickInput {
        pointer_x: target.map(|x| x.clamp(1.0, session.field.width - 1.0)),
        ..TickInput::default()
    }
}
