//! Game state and core simulation types
//!
//! Everything the tick mutates lives in [`GameState`]; nothing is global.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::{self, LevelConfig};
use super::rect::Rect;
use crate::consts::*;

/// Size of the play area in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Where the player appears at level start and after a respawn without checkpoint
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(SPAWN_X, self.height - SPAWN_HEIGHT_FROM_BOTTOM)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT)
    }
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Level built, waiting for start
    Idle,
    /// Active gameplay
    Running,
    /// Simulation frozen; remembers a pending respawn countdown if paused while dead
    Paused { respawn_ticks: Option<u32> },
    /// Player died, respawn after the countdown reaches zero
    Dead { respawn_ticks: u32 },
    /// Goal reached; terminal until reset
    Won,
}

impl SessionPhase {
    pub fn is_paused(&self) -> bool {
        matches!(self, SessionPhase::Paused { .. })
    }
}

/// Movement tuning for the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerTuning {
    /// Horizontal speed while a direction is held (units/tick)
    pub speed: f32,
    /// Upward velocity applied on jump
    pub jump_force: f32,
    /// Added to vertical velocity every tick
    pub gravity: f32,
    /// Speed cap (kept for tuning parity; horizontal input never exceeds `speed`)
    pub max_speed: f32,
    /// Horizontal damping when no direction is held, in [0, 1)
    pub friction: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            jump_force: PLAYER_JUMP_FORCE,
            gravity: PLAYER_GRAVITY,
            max_speed: PLAYER_MAX_SPEED,
            friction: PLAYER_FRICTION,
        }
    }
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub tuning: PlayerTuning,
    /// Airborne after a jump until the next landing
    pub is_jumping: bool,
    /// Standing on a platform after the last collision pass
    pub on_ground: bool,
    /// +1 facing right, -1 facing left
    pub facing: f32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            tuning: PlayerTuning::default(),
            is_jumping: false,
            on_ground: false,
            facing: 1.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Keep the player horizontally inside `[0, width - size.x]`
    pub fn clamp_x(&mut self, width: f32) {
        let max_x = (width - self.size.x).max(0.0);
        self.pos.x = self.pos.x.clamp(0.0, max_x);
    }

    /// Put the player back at `pos` with no motion (respawn / reset)
    pub fn reset_at(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.is_jumping = false;
        self.on_ground = false;
    }
}

/// Decorative role of a static platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    Ground,
    Start,
    #[default]
    Step,
    Static,
    GoalLedge,
}

/// A static solid platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
}

impl Platform {
    pub fn new(rect: Rect, kind: PlatformKind) -> Self {
        Self { rect, kind }
    }
}

/// A platform oscillating horizontally between `min_x` and `max_x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingPlatform {
    pub rect: Rect,
    /// Units per tick
    pub speed: f32,
    /// +1 moving right, -1 moving left
    pub direction: f32,
    pub min_x: f32,
    pub max_x: f32,
}

impl MovingPlatform {
    /// Horizontal displacement applied this tick
    pub fn displacement(&self) -> f32 {
        self.speed * self.direction
    }

    /// Advance one tick; reverse at either bound
    pub fn advance(&mut self) {
        self.rect.x += self.displacement();
        if self.rect.x <= self.min_x || self.rect.right() >= self.max_x {
            self.direction = -self.direction;
        }
    }
}

/// A lethal rectangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub rect: Rect,
}

/// Axis a saw blade travels along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SawAxis {
    Horizontal,
    Vertical,
}

/// A spinning round hazard that oscillates along one axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SawBlade {
    pub center: Vec2,
    pub radius: f32,
    /// Radians per tick (visual only)
    pub angular_speed: f32,
    pub angle: f32,
    pub axis: SawAxis,
    /// Travel range along `axis`
    pub min: f32,
    pub max: f32,
    /// Units per tick
    pub speed: f32,
    pub direction: f32,
}

impl SawBlade {
    pub fn advance(&mut self) {
        self.angle = (self.angle + self.angular_speed) % std::f32::consts::TAU;
        if self.speed == 0.0 {
            return;
        }
        let coord = match self.axis {
            SawAxis::Horizontal => &mut self.center.x,
            SawAxis::Vertical => &mut self.center.y,
        };
        *coord += self.speed * self.direction;
        if *coord <= self.min {
            *coord = self.min;
            self.direction = 1.0;
        } else if *coord >= self.max {
            *coord = self.max;
            self.direction = -1.0;
        }
    }
}

/// The level exit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub rect: Rect,
    /// Render-only pulse phase
    pub pulse: f32,
}

/// The complete live obstacle set. Regeneration replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub platforms: Vec<Platform>,
    pub moving_platforms: Vec<MovingPlatform>,
    pub spikes: Vec<Spike>,
    pub saws: Vec<SawBlade>,
    pub goal: Goal,
}

impl Level {
    /// Advance every self-moving obstacle by one tick
    pub fn advance(&mut self, dt: f32) {
        for platform in &mut self.moving_platforms {
            platform.advance();
        }
        for saw in &mut self.saws {
            saw.advance();
        }
        self.goal.pulse = (self.goal.pulse + dt * GOAL_PULSE_RATE) % std::f32::consts::TAU;
    }

    pub fn obstacle_count(&self) -> usize {
        self.platforms.len() + self.moving_platforms.len() + self.spikes.len() + self.saws.len() + 1
    }
}

/// Particle flavour, for the renderer's color lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Blood,
    Dust,
    Confetti,
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Remaining life in ticks
    pub life: f32,
    pub max_life: f32,
    pub kind: ParticleKind,
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 256;

/// Why the player died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Spike,
    SawBlade,
    /// Side contact with a platform under the lethal contact policy
    Wall,
    /// Dropped below the viewport
    Fall,
}

/// Something that happened during a tick, drained by the session afterwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    Landed,
    Died(DeathCause),
    Respawned,
    /// A safe position worth remembering was reached
    Checkpoint { x: f32, y: f32 },
    Won,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed of the current level
    pub seed: u64,
    pub viewport: Viewport,
    /// Generator and contact configuration
    pub config: LevelConfig,
    pub phase: SessionPhase,
    pub player: Player,
    pub level: Level,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub death_count: u32,
    /// Seconds of unpaused running time
    pub elapsed: f32,
    pub won: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Respawn position if one was recorded
    pub checkpoint: Option<Vec2>,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    /// RNG for cosmetic effects only
    fx_rng: Pcg32,
}

impl GameState {
    /// Create a new session state with a freshly generated level
    pub fn new(viewport: Viewport, config: LevelConfig, seed: u64) -> Self {
        let level = level::generate_or_classic(viewport, &config, seed);
        Self {
            seed,
            viewport,
            config,
            phase: SessionPhase::Idle,
            player: Player::new(viewport.spawn_point()),
            level,
            particles: Vec::new(),
            death_count: 0,
            elapsed: 0.0,
            won: false,
            time_ticks: 0,
            checkpoint: None,
            events: Vec::new(),
            fx_rng: Pcg32::seed_from_u64(seed ^ 0x5eed_f00d),
        }
    }

    /// Respawn position: checkpoint if set, otherwise the level spawn point
    pub fn respawn_point(&self) -> Vec2 {
        self.checkpoint.unwrap_or_else(|| self.viewport.spawn_point())
    }

    /// Replace the level and every per-run counter, keeping configuration
    pub fn reset(&mut self, seed: u64) {
        self.seed = seed;
        self.level = level::generate_or_classic(self.viewport, &self.config, seed);
        self.player = Player::new(self.viewport.spawn_point());
        self.particles.clear();
        self.death_count = 0;
        self.elapsed = 0.0;
        self.won = false;
        self.time_ticks = 0;
        self.checkpoint = None;
        self.events.clear();
        self.phase = SessionPhase::Idle;
        self.fx_rng = Pcg32::seed_from_u64(seed ^ 0x5eed_f00d);
    }

    /// Drain pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Spawn a burst of particles around `at`
    pub fn spawn_burst(&mut self, kind: ParticleKind, at: Vec2, count: usize) {
        let (spread, base_size, size_range, base_life, life_range) = match kind {
            ParticleKind::Blood => (10.0, 3.0, 5.0, 30.0, 20.0),
            ParticleKind::Dust => (3.0, 1.5, 1.5, 10.0, 8.0),
            ParticleKind::Confetti => (14.0, 3.0, 3.0, 60.0, 30.0),
        };
        for _ in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let vel = Vec2::new(
                (self.fx_rng.random::<f32>() - 0.5) * spread,
                (self.fx_rng.random::<f32>() - 0.5) * spread,
            );
            let life = base_life + self.fx_rng.random::<f32>() * life_range;
            self.particles.push(Particle {
                pos: at,
                vel,
                size: base_size + self.fx_rng.random::<f32>() * size_range,
                life,
                max_life: base_life + life_range,
                kind,
            });
        }
    }

    /// Move, shrink and cull particles
    pub fn update_particles(&mut self) {
        for particle in self.particles.iter_mut() {
            particle.pos += particle.vel;
            particle.life -= 1.0;
            particle.size *= 0.98;
        }
        self.particles.retain(|p| p.life > 0.0 && p.size > 0.5);
    }
}
