//! Property tests for problem generation, spawning and collision resolution

use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use math_defender::Tuning;
use math_defender::sim::state::{Bullet, Enemy, EnemyKind, EntityStore, GameStatus, Playfield};
use math_defender::sim::{
    GameSession, HitResult, Operator, ProblemGenerator, decide_correct, generate_distractor,
    generate_problem, pick_kind, resolve_bullet_enemies, resolve_ship_enemies, spawn_enemy,
};

fn enemy(id: u32, pos: Vec2, radius: f32, value: u32, is_correct: bool) -> Enemy {
    Enemy {
        id,
        kind: EnemyKind::Asteroid,
        pos,
        vel: Vec2::ZERO,
        radius,
        angle: 0.0,
        rotation_speed: 0.0,
        origin_x: pos.x,
        phase: 0.0,
        value,
        is_correct,
        active: true,
    }
}

fn playing(seed: u64) -> GameSession {
    let tuning = Tuning {
        power_up_chance: 0.0,
        ..Tuning::default()
    };
    let mut session = GameSession::new(seed, tuning);
    session.start();
    session
}

proptest! {
    #[test]
    fn problems_are_well_formed(seed in any::<u64>(), difficulty in 1u32..200) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let generator = ProblemGenerator::with_operators(&[
            Operator::Add,
            Operator::Subtract,
            Operator::Multiply,
            Operator::Divide,
        ]);
        let problem = generator.generate(difficulty, &mut rng);
        prop_assert_eq!(problem.operator.apply(problem.lhs, problem.rhs), problem.answer);
        match problem.operator {
            Operator::Subtract => prop_assert!(problem.lhs >= problem.rhs),
            Operator::Multiply => {
                prop_assert!((1..=10).contains(&problem.lhs));
                prop_assert!((1..=10).contains(&problem.rhs));
            }
            Operator::Divide => {
                prop_assert!(problem.rhs > 0);
                prop_assert_eq!(problem.lhs % problem.rhs, 0);
            }
            Operator::Add => {}
        }
    }

    #[test]
    fn distractor_never_matches(seed in any::<u64>(), correct in 0u32..10_000) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let wrong = generate_distractor(correct, &mut rng);
        prop_assert_ne!(wrong, correct);
        prop_assert!(wrong.abs_diff(correct) <= 10 || correct < 10);
    }

    #[test]
    fn bullet_hits_exactly_when_circles_overlap(
        ex in 100.0f32..700.0,
        ey in 50.0f32..300.0,
        dx in -80.0f32..80.0,
        dy in -80.0f32..80.0,
        radius in 10.0f32..55.0,
    ) {
        let mut session = playing(1);
        let bullet_pos = Vec2::new(ex + dx, ey + dy);
        let enemy_pos = Vec2::new(ex, ey);
        let reach = radius + math_defender::consts::BULLET_RADIUS;
        prop_assume!((bullet_pos.distance(enemy_pos) - reach).abs() > 1e-3);

        session.store.bullets.push(Bullet::new(bullet_pos, 0.0));
        session.store.enemies.push(enemy(1, enemy_pos, radius, 999, false));
        let hits = resolve_bullet_enemies(&mut session);

        let expected = bullet_pos.distance(enemy_pos) < reach;
        prop_assert_eq!(hits.len() == 1, expected);
        prop_assert_eq!(session.store.enemies[0].active, !expected);
    }

    /// Score only grows, in steps of 10; lives bottom out at zero and the
    /// session ends exactly then.
    #[test]
    fn score_and_lives_invariants(seed in any::<u64>(), actions in prop::collection::vec(0u8..3, 1..40)) {
        let mut session = playing(seed);
        let mut next_id = 1000;

        for action in actions {
            let before_score = session.score;
            let before_lives = session.lives;
            let answer = session.problem.as_ref().map(|p| p.answer).unwrap_or(0);
            let target = Vec2::new(400.0, 150.0);
            next_id += 1;

            match action {
                0 => {
                    session.store.enemies.push(enemy(next_id, target, 30.0, answer, true));
                    session.store.bullets.push(Bullet::new(target, 0.0));
                    resolve_bullet_enemies(&mut session);
                }
                1 => {
                    session.store.enemies.push(enemy(next_id, target, 30.0, answer + 1, false));
                    session.store.bullets.push(Bullet::new(target, 0.0));
                    resolve_bullet_enemies(&mut session);
                }
                _ => {
                    let ship = session.store.ship.pos;
                    session.store.enemies.push(enemy(next_id, ship, 30.0, answer, false));
                    resolve_ship_enemies(&mut session);
                }
            }
            session.store.cull();

            prop_assert!(session.score >= before_score);
            prop_assert!(session.score == before_score || session.score == before_score + 10);
            prop_assert!(session.lives <= before_lives);
            prop_assert_eq!(session.status == GameStatus::GameOver, session.lives == 0);
            if session.status == GameStatus::GameOver {
                break;
            }
        }
    }
}

#[test]
fn spawn_weights_converge() {
    let tuning = Tuning::default();
    let mut rng = Pcg32::seed_from_u64(2024);
    let draws = 100_000;
    let mut counts = [0usize; 3];
    for _ in 0..draws {
        let idx = match pick_kind(&mut rng, &tuning) {
            EnemyKind::Asteroid => 0,
            EnemyKind::Scout => 1,
            EnemyKind::Heavy => 2,
        };
        counts[idx] += 1;
    }
    let total = tuning.total_weight();
    for (kind, count) in EnemyKind::ALL.iter().zip(counts) {
        let expected = tuning.profile(*kind).weight / total;
        let observed = count as f32 / draws as f32;
        assert!(
            (observed - expected).abs() < 0.01,
            "{}: expected {expected}, observed {observed}",
            kind.as_str()
        );
    }
}

#[test]
fn forcing_raises_correct_rate_when_none_active() {
    let tuning = Tuning::default();
    let mut rng = Pcg32::seed_from_u64(77);
    let draws = 100_000;

    let rate = |rng: &mut Pcg32, has_correct: bool| {
        (0..draws)
            .filter(|_| decide_correct(rng, has_correct, &tuning))
            .count() as f32
            / draws as f32
    };

    // 1 - (1 - 0.4) * (1 - 0.7)
    let without = rate(&mut rng, false);
    assert!((without - 0.82).abs() < 0.01, "observed {without}");

    let with = rate(&mut rng, true);
    assert!((with - 0.4).abs() < 0.01, "observed {with}");
}

/// Spawn after spawn against a live store where the oldest enemy leaves once
/// four are on screen.
#[test]
fn spawn_cycles_keep_answer_on_field() {
    let tuning = Tuning::default();
    let field = Playfield::default();
    let mut store = EntityStore::new(&field);
    let mut rng = Pcg32::seed_from_u64(4242);
    let problem = generate_problem(1, &mut rng);

    // [field had no answer, field had one] -> (spawns, correct spawns)
    let mut tally = [(0u32, 0u32); 2];
    let (mut empty_after, mut repeat_empty, mut streak) = (0u32, 0u32, 0u32);

    for _ in 0..100_000 {
        if store.enemies.len() >= 4 {
            store.enemies.remove(0);
        }
        let had_correct = store.has_correct_enemy();
        spawn_enemy(&mut rng, &mut store, &problem, &field, &tuning);
        let spawned = store.enemies.last().map(|e| (e.is_correct, e.value));
        let Some((is_correct, value)) = spawned else {
            panic!("spawn_enemy added nothing");
        };
        assert_eq!(is_correct, value == problem.answer);

        let entry = &mut tally[had_correct as usize];
        entry.0 += 1;
        entry.1 += is_correct as u32;

        if store.has_correct_enemy() {
            streak = 0;
        } else {
            empty_after += 1;
            streak += 1;
            if streak > 1 {
                repeat_empty += 1;
            }
        }
    }

    let rate = |(spawns, correct): (u32, u32)| correct as f32 / spawns as f32;
    let forced = rate(tally[0]);
    let unforced = rate(tally[1]);
    assert!((forced - 0.82).abs() < 0.015, "empty field: {forced}");
    assert!((unforced - 0.4).abs() < 0.015, "answer on field: {unforced}");

    // An empty field stays empty for a second spawn only when the forcing
    // roll and the base roll both miss
    let repeat = repeat_empty as f32 / empty_after as f32;
    assert!((repeat - 0.18).abs() < 0.02, "repeat drought rate {repeat}");
}

#[test]
fn first_overlapping_enemy_consumes_bullet() {
    let mut session = playing(3);
    let pos = Vec2::new(300.0, 200.0);
    session.store.enemies.push(enemy(1, pos, 30.0, 1, false));
    session.store.enemies.push(enemy(2, pos, 30.0, 2, false));
    session.store.bullets.push(Bullet::new(pos, 0.0));

    let hits = resolve_bullet_enemies(&mut session);
    assert_eq!(hits.len(), 1);
    assert!(matches!(hits[0], HitResult::Wrong { value: 1, .. }));
    assert!(session.store.enemies[1].active);
}
