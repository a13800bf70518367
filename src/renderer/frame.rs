//! Frame building
//!
//! Turns a read-only view of the session into a triangle list. Nothing here
//! touches the GPU, so frames can be built and inspected natively.

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors, with_alpha};
use crate::settings::Settings;
use crate::sim::session::GameSession;
use crate::sim::state::{
    Boss, Enemy, EnemyKind, FEEDBACK_TICKS, FeedbackKind, GameStatus, PowerUpKind, Ship,
};

/// Boss health bar size (pixels)
const HEALTH_BAR_WIDTH: f32 = 160.0;
const HEALTH_BAR_HEIGHT: f32 = 12.0;

/// One frame's worth of geometry, in playfield pixels
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub vertices: Vec<Vertex>,
    pub clear_color: [f32; 4],
    /// Camera offset applied for screen shake
    pub shake_offset: Vec2,
}

impl Frame {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Cheap deterministic hash to [-0.5, 0.5)
fn jitter(seed: u64) -> f32 {
    let mut x = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    x ^= x >> 31;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 29;
    (x >> 40) as f32 / (1u64 << 24) as f32 - 0.5
}

/// Build the frame for the current session state
pub fn build_frame(session: &GameSession, settings: &Settings, time_secs: f32) -> Frame {
    let segments = settings.quality.circle_segments();
    let mut world = Vec::with_capacity(4096);

    // Background
    if settings.quality.starfield_enabled() {
        for star in &session.store.stars {
            let half = Vec2::splat(star.size / 2.0);
            let color = with_alpha(colors::STAR, star.brightness);
            world.extend(shapes::rect(star.pos - half, star.pos + half, color));
        }
    }

    if session.status != GameStatus::Menu {
        if settings.trails {
            let trail = &session.store.ship.trail;
            let keep = ((trail.len() as f32) * settings.quality.trail_quality()).ceil() as usize;
            world.extend(shapes::engine_trail(
                &trail[..keep.min(trail.len())],
                colors::ENGINE_TRAIL,
            ));
        }

        for bullet in session.store.bullets.iter().filter(|b| b.active) {
            world.extend(shapes::circle(bullet.pos, bullet.radius, colors::BULLET, 6));
        }

        for enemy in session.store.enemies.iter().filter(|e| e.active) {
            draw_enemy(&mut world, enemy, segments);
        }

        if let Some(boss) = &session.store.boss {
            draw_boss(&mut world, boss, segments);
        }

        for power_up in session.store.power_ups.iter().filter(|p| p.active) {
            let color = match power_up.kind {
                PowerUpKind::Shield => colors::SHIELD,
                PowerUpKind::TripleShot => colors::TRIPLE_SHOT,
                PowerUpKind::Nuke => colors::NUKE,
            };
            let pulse = 1.0 + (time_secs * 6.0).sin() * 0.1;
            let r = power_up.radius * pulse;
            world.extend(shapes::ring(power_up.pos, r * 0.75, r, color, segments));
            world.extend(shapes::circle(power_up.pos, r * 0.45, color, segments));
        }
    }

    if session.status != GameStatus::GameOver {
        draw_ship(&mut world, &session.store.ship, time_secs, session.status);
    }

    let max_particles = settings.max_particles();
    for particle in session.store.particles.iter().take(max_particles) {
        let color = with_alpha(particle.color, particle.life);
        world.extend(shapes::circle(particle.pos, particle.size, color, 5));
    }

    // Screen shake moves the whole world, not the overlay
    let shake_offset = if settings.effective_screen_shake() && session.screen_shake > 0.0 {
        Vec2::new(
            jitter(session.time_ticks * 2),
            jitter(session.time_ticks * 2 + 1),
        ) * session.screen_shake
    } else {
        Vec2::ZERO
    };
    if shake_offset != Vec2::ZERO {
        for v in &mut world {
            v.position[0] += shake_offset.x;
            v.position[1] += shake_offset.y;
        }
    }

    if settings.effective_feedback_flash()
        && let Some(feedback) = session.feedback
    {
        let base = match feedback.kind {
            FeedbackKind::Correct => colors::FLASH_CORRECT,
            FeedbackKind::Wrong => colors::FLASH_WRONG,
        };
        let fade = feedback.ticks_left as f32 / FEEDBACK_TICKS as f32;
        world.extend(shapes::rect(
            Vec2::ZERO,
            Vec2::new(session.field.width, session.field.height),
            with_alpha(base, fade),
        ));
    }

    Frame {
        vertices: world,
        clear_color: colors::BACKGROUND,
        shake_offset,
    }
}

fn draw_ship(out: &mut Vec<Vertex>, ship: &Ship, time_secs: f32, status: GameStatus) {
    let (w, h) = (ship.width / 2.0, ship.height / 2.0);
    let outline = [
        Vec2::new(0.0, -h),
        Vec2::new(w, h),
        Vec2::new(0.0, h * 0.5),
        Vec2::new(-w, h),
    ];
    // Idle bob on the title screen
    let bob = if status == GameStatus::Menu {
        Vec2::new(0.0, (time_secs * 2.0).sin() * 4.0)
    } else {
        Vec2::ZERO
    };
    out.extend(shapes::polygon(ship.pos + bob, &outline, ship.tilt, colors::SHIP));
    out.extend(shapes::circle(
        ship.pos + bob + Vec2::new(0.0, -h * 0.2),
        w * 0.25,
        colors::SHIP_COCKPIT,
        8,
    ));
}

fn draw_boss(out: &mut Vec<Vertex>, boss: &Boss, segments: u32) {
    let r = boss.radius;
    let wings = [
        Vec2::new(0.0, 20.0),
        Vec2::new(-r * 1.5, -r * 0.5),
        Vec2::new(-r * 0.8, -r * 0.8),
        Vec2::new(r * 0.8, -r * 0.8),
        Vec2::new(r * 1.5, -r * 0.5),
    ];
    out.extend(shapes::polygon(boss.pos, &wings, 0.0, colors::BOSS_WING));

    let hull = [
        Vec2::new(0.0, r),
        Vec2::new(r * 0.45, r * 0.4),
        Vec2::new(r * 0.85, -r * 0.3),
        Vec2::new(r * 0.8, -r * 0.8),
        Vec2::new(-r * 0.8, -r * 0.8),
        Vec2::new(-r * 0.85, -r * 0.3),
        Vec2::new(-r * 0.45, r * 0.4),
    ];
    out.extend(shapes::polygon(boss.pos, &hull, 0.0, colors::BOSS_HULL));

    for offset in [-0.4, 0.4] {
        out.extend(shapes::circle(
            boss.pos + Vec2::new(r * offset, -r * 0.7),
            10.0,
            colors::BOSS_THRUSTER,
            segments,
        ));
    }
    out.extend(shapes::circle(boss.pos, 20.0, colors::BOSS_CORE, segments));
    out.extend(shapes::circle(boss.pos, 10.0, colors::BOSS_IRIS, segments));

    // Health bar above the hull
    let min = boss.pos + Vec2::new(-HEALTH_BAR_WIDTH / 2.0, -r - 40.0);
    let max = min + Vec2::new(HEALTH_BAR_WIDTH, HEALTH_BAR_HEIGHT);
    out.extend(shapes::rect(min, max, colors::HEALTH_BACK));
    let fill_width = (HEALTH_BAR_WIDTH - 4.0) * boss.health_fraction();
    if fill_width > 0.0 {
        let fill_min = min + Vec2::splat(2.0);
        out.extend(shapes::rect(
            fill_min,
            fill_min + Vec2::new(fill_width, HEALTH_BAR_HEIGHT - 4.0),
            colors::HEALTH_FILL,
        ));
    }
    let corners = [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)];
    for i in 0..4 {
        out.extend(shapes::segment(
            corners[i],
            corners[(i + 1) % 4],
            2.0,
            colors::HEALTH_FRAME,
        ));
    }
}

fn draw_enemy(out: &mut Vec<Vertex>, enemy: &Enemy, segments: u32) {
    let r = enemy.radius;
    match enemy.kind {
        EnemyKind::Asteroid => {
            // Lumpy outline, stable per enemy
            let outline: Vec<Vec2> = (0..9)
                .map(|i| {
                    let angle = i as f32 / 9.0 * std::f32::consts::TAU;
                    let lump = 0.85 + (jitter(enemy.id as u64 * 16 + i) + 0.5) * 0.25;
                    Vec2::from_angle(angle) * r * lump
                })
                .collect();
            out.extend(shapes::polygon(enemy.pos, &outline, enemy.angle, colors::ASTEROID));
        }
        EnemyKind::Scout => {
            // Arrowhead pointing down the screen
            let outline = [
                Vec2::new(0.0, r),
                Vec2::new(r, -r * 0.6),
                Vec2::new(0.0, -r * 0.2),
                Vec2::new(-r, -r * 0.6),
            ];
            out.extend(shapes::polygon(enemy.pos, &outline, 0.0, colors::SCOUT));
        }
        EnemyKind::Heavy => {
            let outline: Vec<Vec2> = (0..6)
                .map(|i| Vec2::from_angle(i as f32 / 6.0 * std::f32::consts::TAU) * r)
                .collect();
            out.extend(shapes::polygon(enemy.pos, &outline, 0.0, colors::HEAVY));
            out.extend(shapes::ring(
                enemy.pos,
                r * 0.8,
                r * 0.9,
                with_alpha(colors::VALUE_TEXT, 0.3),
                segments,
            ));
        }
    }

    let digit_height = (r * 0.7).min(28.0);
    out.extend(shapes::number(
        enemy.value,
        enemy.pos,
        digit_height,
        colors::VALUE_TEXT,
    ));
}
