//! Entity types and the per-session entity store
//!
//! Everything the simulation moves each tick lives here. The store is owned by
//! `GameSession` and only mutated from inside `tick`.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::{BossProfile, EnemyProfile};

/// RGBA color in linear 0-1 space
pub type Color = [f32; 4];

/// Particle palettes for the different burst types
pub mod palette {
    use super::Color;

    /// Ship impacts and wrong answers: hot pink, plum, cyan debris
    pub const EXPLOSION: [Color; 3] = [
        [1.0, 0.0, 0.6, 1.0],
        [0.29, 0.2, 0.25, 1.0],
        [0.0, 0.95, 1.0, 1.0],
    ];
    /// Correct answer burst
    pub const SUCCESS: [Color; 2] = [[0.0, 1.0, 0.0, 1.0], [1.0, 1.0, 1.0, 1.0]];
    /// Enemies wiped off the field after a correct answer
    pub const CLEARED: [Color; 1] = [[1.0, 1.0, 1.0, 1.0]];
    /// Sparks where a bullet strikes the boss hull
    pub const BOSS_HIT: [Color; 2] = [[0.94, 0.27, 0.27, 1.0], [0.97, 0.44, 0.44, 1.0]];
    /// Boss destroyed
    pub const BOSS_DEFEATED: [Color; 3] = [
        [0.94, 0.27, 0.27, 1.0],
        [0.96, 0.62, 0.04, 1.0],
        [1.0, 1.0, 1.0, 1.0],
    ];
}

/// Current status of a play session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// Waiting for the player to start
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Lives ran out; waiting for restart
    GameOver,
}

/// Playfield dimensions in pixels. Origin is top-left, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
        }
    }
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        // Narrower than the ship would make clamping meaningless
        Self {
            width: width.max(SHIP_SIZE * 2.0),
            height: height.max(SHIP_SIZE * 4.0),
        }
    }

    /// Where the ship sits at session start
    pub fn ship_home(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height - SHIP_BOTTOM_OFFSET)
    }
}

/// Trail sample for the ship's engine plume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub width: f32,
    pub alpha: f32,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    /// Displacement applied during the last tick
    pub vel: Vec2,
    /// Collision radius
    pub radius: f32,
    pub width: f32,
    pub height: f32,
    /// Banking angle (radians), derived from pointer smoothing
    pub tilt: f32,
    /// Ticks until the next autofire
    pub cooldown: u32,
    /// Engine trail (newest first)
    pub trail: Vec<TrailPoint>,
}

impl Ship {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: SHIP_RADIUS,
            width: SHIP_SIZE,
            height: SHIP_SIZE,
            tilt: 0.0,
            cooldown: 0,
            trail: Vec::new(),
        }
    }

    /// Age existing samples, then push a fresh one at the engine nozzle.
    pub fn record_trail(&mut self, max_len: usize) {
        for point in &mut self.trail {
            point.pos.y += 2.0; // Drift down
            point.width *= 0.9;
            point.alpha -= 0.05;
        }
        self.trail.insert(
            0,
            TrailPoint {
                pos: Vec2::new(self.pos.x, self.pos.y + 15.0),
                width: 10.0,
                alpha: 1.0,
            },
        );
        self.trail.truncate(max_len);
    }

    /// Muzzle position for new bullets
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y - self.height / 2.0)
    }
}

/// A player bullet (always travels straight up)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub active: bool,
}

impl Bullet {
    pub fn new(pos: Vec2, speed: f32) -> Self {
        Self {
            pos,
            vel: Vec2::new(0.0, -speed),
            radius: BULLET_RADIUS,
            active: true,
        }
    }
}

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Common tumbling rock
    Asteroid,
    /// Fast, weaves side to side
    Scout,
    /// Big and slow with a slight sway
    Heavy,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Asteroid, EnemyKind::Scout, EnemyKind::Heavy];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Asteroid => "Asteroid",
            EnemyKind::Scout => "Scout",
            EnemyKind::Heavy => "Heavy",
        }
    }
}

/// A descending enemy carrying a candidate answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Current rotation (asteroids only)
    pub angle: f32,
    pub rotation_speed: f32,
    /// Spawn x, center of the sway pattern
    pub origin_x: f32,
    /// Per-enemy phase offset for the sway pattern
    pub phase: f32,
    /// Displayed candidate answer
    pub value: u32,
    /// Whether `value` answers the problem current at spawn time
    pub is_correct: bool,
    pub active: bool,
}

impl Enemy {
    /// Move one tick according to the kind's motion pattern.
    pub fn advance(&mut self, profile: &EnemyProfile, time_ticks: u64, field_width: f32) {
        self.pos.y += self.vel.y;
        let t = time_ticks as f32;

        match self.kind {
            EnemyKind::Asteroid => {
                self.angle += self.rotation_speed;
            }
            EnemyKind::Scout => {
                let x = self.origin_x
                    + (t * profile.sway_frequency + self.phase).sin() * profile.sway_amplitude;
                self.pos.x = x.max(self.radius).min(field_width - self.radius);
            }
            EnemyKind::Heavy => {
                self.pos.x = self.origin_x
                    + (t * profile.sway_frequency + self.phase).sin() * profile.sway_amplitude;
            }
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32, // 0-1, decreases over time
    pub size: f32,
    pub color: Color,
}

/// Parallax background star
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    /// Depth factor; nearer layers are larger and faster
    pub z: f32,
    pub size: f32,
    pub speed: f32,
    pub brightness: f32,
}

/// Star layers: (count, depth factor, size scale)
pub const STAR_LAYERS: [(usize, f32, f32); 3] = [(150, 0.2, 0.5), (60, 0.5, 1.0), (20, 1.2, 2.0)];

impl Star {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, field: &Playfield, z: f32, size_scale: f32) -> Self {
        Self {
            pos: Vec2::new(
                rng.random::<f32>() * field.width,
                rng.random::<f32>() * field.height,
            ),
            z,
            size: rng.random::<f32>() * size_scale + 0.5,
            speed: (rng.random::<f32>() * 0.5 + 0.2) * z,
            brightness: rng.random::<f32>() * 0.5 + 0.5,
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Restores a life
    Shield,
    /// Three parallel bullets per shot for a while
    TripleShot,
    /// Destroys every enemy on screen
    Nuke,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::Shield,
        PowerUpKind::TripleShot,
        PowerUpKind::Nuke,
    ];
}

/// A falling power-up capsule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub radius: f32,
    pub active: bool,
}

/// Mothership: flies in from the top, then patrols side to side soaking up
/// bullets until its health runs out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    /// Signed patrol speed
    pub vel_x: f32,
    pub radius: f32,
    pub health: u32,
    pub max_health: u32,
    /// Still descending to patrol height
    pub entering: bool,
}

impl Boss {
    pub fn new(field: &Playfield, profile: &BossProfile, health: u32) -> Self {
        Self {
            pos: Vec2::new(field.width / 2.0, -profile.hover_y),
            vel_x: profile.speed,
            radius: profile.radius,
            health,
            max_health: health,
            entering: true,
        }
    }

    pub fn advance(&mut self, profile: &BossProfile, time_ticks: u64, field_width: f32) {
        if self.entering {
            self.pos.y += profile.entry_speed;
            if self.pos.y >= profile.hover_y {
                self.entering = false;
            }
            return;
        }

        self.pos.x += self.vel_x;
        if self.pos.x > field_width - profile.edge_margin {
            self.vel_x = -self.vel_x.abs();
        } else if self.pos.x < profile.edge_margin {
            self.vel_x = self.vel_x.abs();
        }
        self.pos.y = profile.hover_y
            + (time_ticks as f32 * profile.bob_frequency).sin() * profile.bob_amplitude;
    }

    /// Remaining health in [0, 1]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            0.0
        } else {
            self.health as f32 / self.max_health as f32
        }
    }
}

/// Fall speed of power-ups (pixels per tick)
pub const POWER_UP_FALL_SPEED: f32 = 2.0;
pub const POWER_UP_RADIUS: f32 = 15.0;

/// Full-screen hit feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackKind {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub ticks_left: u32,
}

/// Feedback flash duration (300 ms at 60 Hz)
pub const FEEDBACK_TICKS: u32 = 18;
/// Screen shake magnitude applied on damage
pub const DAMAGE_SHAKE: f32 = 15.0;

/// Things that happened during a tick, drained by the host for audio/HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Autofire released a volley
    Shot,
    /// A bullet hit the enemy carrying the answer
    CorrectHit { value: u32 },
    /// A bullet hit a distractor
    WrongHit { value: u32 },
    /// The ship rammed an enemy
    ShipHit,
    /// A new problem replaced the old one
    ProblemChanged { question: String },
    PowerUpCollected(PowerUpKind),
    /// A boss started its approach
    BossSpawned { health: u32 },
    /// A bullet struck the boss
    BossHit { health_left: u32 },
    BossDefeated { bonus: u32 },
    /// Lives ran out
    GameOver { score: u32 },
}

/// All simulation entities for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore {
    pub ship: Ship,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub particles: Vec<Particle>,
    pub stars: Vec<Star>,
    pub power_ups: Vec<PowerUp>,
    pub boss: Option<Boss>,
    /// Next enemy ID
    next_id: u32,
}

impl EntityStore {
    pub fn new(field: &Playfield) -> Self {
        Self {
            ship: Ship::new(field.ship_home()),
            bullets: Vec::new(),
            enemies: Vec::new(),
            particles: Vec::new(),
            stars: Vec::new(),
            power_ups: Vec::new(),
            boss: None,
            next_id: 1,
        }
    }

    /// Allocate a new enemy ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Populate the three parallax layers
    pub fn seed_stars<R: Rng + ?Sized>(&mut self, rng: &mut R, field: &Playfield) {
        self.stars.clear();
        for (count, z, size_scale) in STAR_LAYERS {
            for _ in 0..count {
                self.stars.push(Star::random(rng, field, z, size_scale));
            }
        }
    }

    pub fn active_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.active)
    }

    /// Whether any live enemy shows the current answer
    pub fn has_correct_enemy(&self) -> bool {
        self.active_enemies().any(|e| e.is_correct)
    }

    /// Spawn a radial burst of particles
    pub fn spawn_burst<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        pos: Vec2,
        colors: &[Color],
        count: usize,
    ) {
        for _ in 0..count {
            let angle = rng.random::<f32>() * TAU;
            let speed = rng.random::<f32>() * 4.0 + 1.0;
            let color = if colors.is_empty() {
                [1.0; 4]
            } else {
                colors[rng.random_range(0..colors.len())]
            };
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                life: 1.0,
                size: rng.random::<f32>() * 3.0 + 1.0,
                color,
            });
        }
    }

    /// Drop everything that is inactive or burnt out
    pub fn cull(&mut self) {
        self.bullets.retain(|b| b.active);
        self.enemies.retain(|e| e.active);
        self.particles.retain(|p| p.life > 0.0);
        self.power_ups.retain(|p| p.active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_trail_is_capped_and_fades() {
        let mut ship = Ship::new(Vec2::new(100.0, 500.0));
        for _ in 0..30 {
            ship.record_trail(20);
        }
        assert_eq!(ship.trail.len(), 20);
        assert_eq!(ship.trail[0].alpha, 1.0);
        assert!(ship.trail[19].alpha < ship.trail[1].alpha);
        assert!(ship.trail[19].width < ship.trail[0].width);
        assert!(ship.trail[19].pos.y > ship.trail[0].pos.y);
    }

    #[test]
    fn test_seed_stars_layers() {
        let field = Playfield::default();
        let mut store = EntityStore::new(&field);
        let mut rng = Pcg32::seed_from_u64(7);
        store.seed_stars(&mut rng, &field);
        assert_eq!(store.stars.len(), 230);
        assert!(store.stars.iter().all(|s| s.pos.x >= 0.0 && s.pos.x <= field.width));
        // Nearer stars are never slower than the slowest far star could be
        let near_min = store
            .stars
            .iter()
            .filter(|s| s.z > 1.0)
            .map(|s| s.speed)
            .fold(f32::MAX, f32::min);
        assert!(near_min >= 0.2 * 1.2 - f32::EPSILON);
    }

    #[test]
    fn test_burst_and_cull() {
        let field = Playfield::default();
        let mut store = EntityStore::new(&field);
        let mut rng = Pcg32::seed_from_u64(1);
        store.spawn_burst(&mut rng, Vec2::new(10.0, 10.0), &palette::SUCCESS, 20);
        assert_eq!(store.particles.len(), 20);
        assert!(store.particles.iter().all(|p| p.life == 1.0));

        store.particles[0].life = 0.0;
        store.bullets.push(Bullet {
            active: false,
            ..Bullet::new(Vec2::ZERO, 15.0)
        });
        store.cull();
        assert_eq!(store.particles.len(), 19);
        assert!(store.bullets.is_empty());
    }

    #[test]
    fn test_boss_enters_then_patrols() {
        let field = Playfield::default();
        let profile = BossProfile::default();
        let mut boss = Boss::new(&field, &profile, 30);
        assert_eq!(boss.pos, Vec2::new(400.0, -100.0));

        let mut ticks = 0;
        while boss.entering {
            boss.advance(&profile, ticks, field.width);
            ticks += 1;
        }
        assert_eq!(ticks, 100);
        assert!(boss.pos.y >= profile.hover_y);

        // Patrols right, turns around at the margin, never leaves the band
        for t in 0..400 {
            boss.advance(&profile, ticks + t, field.width);
            assert!(boss.pos.x >= profile.edge_margin - profile.speed - 0.01);
            assert!(boss.pos.x <= field.width - profile.edge_margin + profile.speed + 0.01);
            assert!((boss.pos.y - profile.hover_y).abs() <= profile.bob_amplitude + 0.01);
        }
        assert_eq!(boss.health_fraction(), 1.0);
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut store = EntityStore::new(&Playfield::default());
        let a = store.next_entity_id();
        let b = store.next_entity_id();
        assert_ne!(a, b);
    }
}
