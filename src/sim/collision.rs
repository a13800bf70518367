//! Collision detection and resolution
//!
//! All checks are circle-circle with strict overlap (`dist < r1 + r2`).
//! Resolution applies the game-state side effects: score, lives, problem
//! rotation, power-up drops.

use glam::Vec2;
use rand::Rng;

use super::session::GameSession;
use super::state::{
    FeedbackKind, GameEvent, GameStatus, POWER_UP_RADIUS, PowerUp, PowerUpKind, palette,
};
use crate::circles_overlap;
use crate::consts::{POINTS_PER_CORRECT, POINTS_PER_NUKE};

/// Particles per enemy wiped by a correct answer
const CLEAR_BURST: usize = 10;
const BOSS_HIT_BURST: usize = 5;
const BOSS_DEFEAT_BURST: usize = 100;

/// Outcome of a bullet meeting an enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitResult {
    Correct { value: u32, pos: Vec2 },
    Wrong { value: u32, pos: Vec2 },
}

/// Ship against every active enemy. Returns the number of collisions that
/// cost a life.
///
/// Every overlapping enemy is destroyed, but once the last life is gone the
/// remaining impacts produce no further damage or events.
pub fn resolve_ship_enemies(session: &mut GameSession) -> usize {
    let ship_pos = session.store.ship.pos;
    let ship_radius = session.store.ship.radius;

    let mut hits = Vec::new();
    for enemy in session.store.enemies.iter_mut().filter(|e| e.active) {
        if circles_overlap(ship_pos, ship_radius, enemy.pos, enemy.radius) {
            enemy.active = false;
            hits.push(enemy.pos);
        }
    }

    let mut resolved = 0;
    for &pos in &hits {
        if session.status != GameStatus::Playing {
            break;
        }
        session.stats.ship_hits += 1;
        session.events.push(GameEvent::ShipHit);
        session.take_damage(pos);
        resolved += 1;
    }
    resolved
}

/// Bullets against the boss, if one is on the field. Returns the number of
/// bullets that struck it.
pub fn resolve_bullet_boss(session: &mut GameSession) -> usize {
    let Some(boss) = session.store.boss.as_mut() else {
        return 0;
    };

    let mut impacts = Vec::new();
    for bullet in session.store.bullets.iter_mut().filter(|b| b.active) {
        if boss.health == 0 {
            break;
        }
        if circles_overlap(bullet.pos, bullet.radius, boss.pos, boss.radius) {
            bullet.active = false;
            boss.health -= 1;
            impacts.push((bullet.pos, boss.health));
        }
    }
    let (boss_pos, defeated) = (boss.pos, boss.health == 0);

    for &(pos, health_left) in &impacts {
        session.burst(pos, &palette::BOSS_HIT, BOSS_HIT_BURST);
        session.events.push(GameEvent::BossHit { health_left });
    }

    if defeated {
        let bonus = session.tuning.boss.bonus;
        session.store.boss = None;
        session.burst(boss_pos, &palette::BOSS_DEFEATED, BOSS_DEFEAT_BURST);
        session.score += bonus;
        // The bonus itself never summons the next boss
        session.next_boss_score = session.tuning.boss.next_threshold(session.score);
        session.events.push(GameEvent::BossDefeated { bonus });
        log::info!(
            "Boss defeated: +{} (score {}, next boss at {:?})",
            bonus,
            session.score,
            session.next_boss_score
        );
    }
    impacts.len()
}

/// Every active bullet against every active enemy.
///
/// A bullet is consumed by the first enemy it overlaps. Resolution stops as
/// soon as the session ends.
pub fn resolve_bullet_enemies(session: &mut GameSession) -> Vec<HitResult> {
    let mut results = Vec::new();

    for bi in 0..session.store.bullets.len() {
        if session.status != GameStatus::Playing {
            break;
        }
        let bullet = &session.store.bullets[bi];
        if !bullet.active {
            continue;
        }
        let (bullet_pos, bullet_radius) = (bullet.pos, bullet.radius);

        let Some(enemy) = session
            .store
            .enemies
            .iter_mut()
            .find(|e| e.active && circles_overlap(bullet_pos, bullet_radius, e.pos, e.radius))
        else {
            continue;
        };
        enemy.active = false;
        let (id, pos, value, is_correct) = (enemy.id, enemy.pos, enemy.value, enemy.is_correct);
        session.store.bullets[bi].active = false;

        if is_correct {
            on_correct_hit(session, id, pos, value);
            results.push(HitResult::Correct { value, pos });
        } else {
            on_wrong_hit(session, pos, value);
            results.push(HitResult::Wrong { value, pos });
        }
    }

    results
}

fn on_correct_hit(session: &mut GameSession, enemy_id: u32, pos: Vec2, value: u32) {
    session.burst(pos, &palette::SUCCESS, session.tuning.particle_count);
    session.score += POINTS_PER_CORRECT;
    session.stats.correct_hits += 1;
    session.flash(FeedbackKind::Correct);
    session.events.push(GameEvent::CorrectHit { value });

    session.next_problem();

    // Clean slate: everything else on screen belonged to the old problem
    let cleared: Vec<Vec2> = session
        .store
        .enemies
        .iter_mut()
        .filter(|e| e.active && e.id != enemy_id)
        .map(|e| {
            e.active = false;
            e.pos
        })
        .collect();
    for p in cleared {
        session.burst(p, &palette::CLEARED, CLEAR_BURST);
    }

    maybe_drop_power_up(session, pos);
}

fn on_wrong_hit(session: &mut GameSession, pos: Vec2, value: u32) {
    session.stats.wrong_hits += 1;
    session.flash(FeedbackKind::Wrong);
    session.events.push(GameEvent::WrongHit { value });
    session.take_damage(pos);
}

fn maybe_drop_power_up(session: &mut GameSession, pos: Vec2) {
    let chance = session.tuning.power_up_chance;
    if chance <= 0.0 || session.roll() >= chance {
        return;
    }
    let kind = PowerUpKind::ALL[session.rng.random_range(0..PowerUpKind::ALL.len())];
    log::debug!("Power-up dropped: {:?}", kind);
    session.store.power_ups.push(PowerUp {
        kind,
        pos,
        radius: POWER_UP_RADIUS,
        active: true,
    });
}

/// Ship against falling power-ups. Returns the kinds collected.
pub fn resolve_power_ups(session: &mut GameSession) -> Vec<PowerUpKind> {
    let ship_pos = session.store.ship.pos;
    let ship_radius = session.store.ship.radius;

    let mut collected = Vec::new();
    for power_up in session.store.power_ups.iter_mut().filter(|p| p.active) {
        if circles_overlap(ship_pos, ship_radius, power_up.pos, power_up.radius) {
            power_up.active = false;
            collected.push(power_up.kind);
        }
    }

    for &kind in &collected {
        apply_power_up(session, kind);
    }
    collected
}

fn apply_power_up(session: &mut GameSession, kind: PowerUpKind) {
    match kind {
        PowerUpKind::Shield => session.gain_life(),
        PowerUpKind::TripleShot => session.triple_shot_ticks = session.tuning.triple_shot_ticks,
        PowerUpKind::Nuke => {
            let destroyed: Vec<Vec2> = session
                .store
                .enemies
                .iter_mut()
                .filter(|e| e.active)
                .map(|e| {
                    e.active = false;
                    e.pos
                })
                .collect();
            for pos in destroyed {
                session.burst(pos, &palette::EXPLOSION, session.tuning.particle_count);
            }
            session.score += POINTS_PER_NUKE;
        }
    }
    log::info!("Collected {:?} (lives {}, score {})", kind, session.lives, session.score);
    session.events.push(GameEvent::PowerUpCollected(kind));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Boss, Bullet, Enemy, EnemyKind};
    use crate::tuning::Tuning;

    fn playing_session() -> GameSession {
        let tuning = Tuning {
            power_up_chance: 0.0,
            ..Tuning::default()
        };
        let mut session = GameSession::new(99, tuning);
        session.start();
        session.events.clear();
        session
    }

    fn place_enemy(session: &mut GameSession, pos: Vec2, correct: bool) -> u32 {
        let id = session.store.next_entity_id();
        let answer = session.problem.as_ref().map(|p| p.answer).unwrap_or(0);
        session.store.enemies.push(Enemy {
            id,
            kind: EnemyKind::Asteroid,
            pos,
            vel: Vec2::ZERO,
            radius: 30.0,
            angle: 0.0,
            rotation_speed: 0.0,
            origin_x: pos.x,
            phase: 0.0,
            value: if correct { answer } else { answer + 3 },
            is_correct: correct,
            active: true,
        });
        id
    }

    #[test]
    fn test_correct_hit_scores_and_clears_field() {
        let mut session = playing_session();
        let old_problem = session.problems_generated;
        place_enemy(&mut session, Vec2::new(100.0, 200.0), true);
        place_enemy(&mut session, Vec2::new(600.0, 100.0), false);
        session
            .store
            .bullets
            .push(Bullet::new(Vec2::new(100.0, 220.0), 15.0));

        let results = resolve_bullet_enemies(&mut session);
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], HitResult::Correct { .. }));
        assert_eq!(session.score, 10);
        assert_eq!(session.lives, 3);
        assert_eq!(session.problems_generated, old_problem + 1);
        assert!(session.store.enemies.iter().all(|e| !e.active));
        assert!(session.store.bullets.iter().all(|b| !b.active));
        assert_eq!(
            session.feedback.map(|f| f.kind),
            Some(FeedbackKind::Correct)
        );
    }

    #[test]
    fn test_wrong_hit_costs_life_not_score() {
        let mut session = playing_session();
        place_enemy(&mut session, Vec2::new(300.0, 300.0), false);
        session
            .store
            .bullets
            .push(Bullet::new(Vec2::new(310.0, 310.0), 15.0));

        let results = resolve_bullet_enemies(&mut session);
        assert!(matches!(results[0], HitResult::Wrong { .. }));
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, 2);
        assert_eq!(session.screen_shake, 15.0);
        assert!(session.events.contains(&GameEvent::WrongHit {
            value: session.store.enemies[0].value
        }));
    }

    #[test]
    fn test_touching_circles_do_not_collide() {
        let mut session = playing_session();
        place_enemy(&mut session, Vec2::new(300.0, 300.0), true);
        // 30 + 3 apart exactly
        session
            .store
            .bullets
            .push(Bullet::new(Vec2::new(333.0, 300.0), 15.0));
        assert!(resolve_bullet_enemies(&mut session).is_empty());
        assert!(session.store.enemies[0].active);
    }

    #[test]
    fn test_bullet_consumed_by_one_enemy() {
        let mut session = playing_session();
        place_enemy(&mut session, Vec2::new(300.0, 300.0), false);
        place_enemy(&mut session, Vec2::new(300.0, 310.0), false);
        session
            .store
            .bullets
            .push(Bullet::new(Vec2::new(300.0, 305.0), 15.0));
        assert_eq!(resolve_bullet_enemies(&mut session).len(), 1);
        assert_eq!(session.lives, 2);
    }

    #[test]
    fn test_ship_collision() {
        let mut session = playing_session();
        let ship = session.store.ship.pos;
        place_enemy(&mut session, ship + Vec2::new(0.0, -40.0), true);
        assert_eq!(resolve_ship_enemies(&mut session), 1);
        assert_eq!(session.lives, 2);
        assert_eq!(session.stats.ship_hits, 1);
        assert!(!session.store.enemies[0].active);
    }

    #[test]
    fn test_no_resolution_after_game_over() {
        let mut session = playing_session();
        session.lives = 1;
        for i in 0..3 {
            let x = 100.0 + i as f32 * 200.0;
            place_enemy(&mut session, Vec2::new(x, 300.0), false);
            session.store.bullets.push(Bullet::new(Vec2::new(x, 300.0), 15.0));
        }
        let results = resolve_bullet_enemies(&mut session);
        assert_eq!(results.len(), 1);
        assert_eq!(session.status, GameStatus::GameOver);
        assert_eq!(session.lives, 0);
    }

    #[test]
    fn test_power_up_effects() {
        let mut session = playing_session();
        let ship = session.store.ship.pos;
        for kind in PowerUpKind::ALL {
            session.store.power_ups.push(PowerUp {
                kind,
                pos: ship,
                radius: POWER_UP_RADIUS,
                active: true,
            });
        }
        place_enemy(&mut session, Vec2::new(100.0, 100.0), false);

        let collected = resolve_power_ups(&mut session);
        assert_eq!(collected.len(), 3);
        assert_eq!(session.lives, 4);
        assert_eq!(session.triple_shot_ticks, 600);
        assert_eq!(session.score, 50);
        assert!(session.store.enemies.iter().all(|e| !e.active));
    }

    #[test]
    fn test_guaranteed_drop() {
        let mut session = playing_session();
        session.tuning.power_up_chance = 1.0;
        place_enemy(&mut session, Vec2::new(100.0, 200.0), true);
        session
            .store
            .bullets
            .push(Bullet::new(Vec2::new(100.0, 200.0), 15.0));
        resolve_bullet_enemies(&mut session);
        assert_eq!(session.store.power_ups.len(), 1);
        assert_eq!(session.store.power_ups[0].pos, Vec2::new(100.0, 200.0));
    }

    #[test]
    fn test_pileup_on_last_life_ends_quietly() {
        let mut session = playing_session();
        session.lives = 1;
        let ship = session.store.ship.pos;
        for _ in 0..3 {
            place_enemy(&mut session, ship, false);
        }

        assert_eq!(resolve_ship_enemies(&mut session), 1);
        assert_eq!(session.status, GameStatus::GameOver);
        assert_eq!(session.stats.ship_hits, 1);
        assert!(session.store.enemies.iter().all(|e| !e.active));
        assert_eq!(
            session.drain_events(),
            vec![GameEvent::ShipHit, GameEvent::GameOver { score: 0 }]
        );
    }

    fn place_boss(session: &mut GameSession, health: u32) -> Vec2 {
        let mut boss = Boss::new(&session.field, &session.tuning.boss, health);
        boss.pos = Vec2::new(400.0, 100.0);
        boss.entering = false;
        session.store.boss = Some(boss);
        Vec2::new(400.0, 100.0)
    }

    #[test]
    fn test_bullets_wear_down_boss() {
        let mut session = playing_session();
        let pos = place_boss(&mut session, 30);
        session.store.bullets.push(Bullet::new(pos, 15.0));
        session.store.bullets.push(Bullet::new(pos + Vec2::new(40.0, 0.0), 15.0));
        // Well clear of the hull
        session.store.bullets.push(Bullet::new(Vec2::new(50.0, 400.0), 15.0));

        assert_eq!(resolve_bullet_boss(&mut session), 2);
        assert_eq!(session.store.boss.as_ref().map(|b| b.health), Some(28));
        assert_eq!(session.store.bullets.iter().filter(|b| b.active).count(), 1);
        assert_eq!(session.store.particles.len(), 10);
        assert_eq!(session.score, 0);
        assert_eq!(
            session.drain_events(),
            vec![
                GameEvent::BossHit { health_left: 29 },
                GameEvent::BossHit { health_left: 28 }
            ]
        );
    }

    #[test]
    fn test_boss_kill_awards_bonus() {
        let mut session = playing_session();
        session.score = 500;
        session.next_boss_score = Some(1000);
        let pos = place_boss(&mut session, 1);
        // The second bullet finds no boss left to hit
        session.store.bullets.push(Bullet::new(pos, 15.0));
        session.store.bullets.push(Bullet::new(pos, 15.0));

        assert_eq!(resolve_bullet_boss(&mut session), 1);
        assert!(session.store.boss.is_none());
        assert_eq!(session.score, 1000);
        assert_eq!(session.next_boss_score, Some(1500));
        assert_eq!(session.store.particles.len(), 5 + 100);
        assert!(session.store.bullets[1].active);
        assert!(session.events.contains(&GameEvent::BossDefeated { bonus: 500 }));
    }

    #[test]
    fn test_no_boss_no_hits() {
        let mut session = playing_session();
        session.store.bullets.push(Bullet::new(Vec2::new(400.0, 100.0), 15.0));
        assert_eq!(resolve_bullet_boss(&mut session), 0);
        assert!(session.store.bullets[0].active);
    }
}
