//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick per frame, units per tick)
//! - Seeded RNG only
//! - Stable iteration order (obstacles are resolved in list order)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod level;
pub mod physics;
pub mod rect;
pub mod state;
pub mod tick;

pub use collision::{CollisionReport, Contact, resolve_collisions};
pub use level::{
    Difficulty, HorizontalContact, LevelConfig, LevelError, LevelLayout, generate,
    generate_or_classic,
};
pub use physics::{StepOutcome, step_player};
pub use rect::Rect;
pub use state::{
    DeathCause, GameEvent, GameState, Goal, Level, MovingPlatform, Particle, ParticleKind,
    Platform, PlatformKind, Player, PlayerTuning, SawAxis, SawBlade, SessionPhase, Spike,
    Viewport, MAX_PARTICLES,
};
pub use tick::{TickInput, tick};
