//! Hell's Gauntlet - a single-screen "Level Devil" style platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level generation, physics, collisions, session tick)
//! - `platform`: Host abstraction (input merging, key-value storage)
//! - `persistence`: Save slot and checkpoint on top of platform storage
//! - `audio`: Fire-and-forget sound cues
//! - `achievements`: Cross-session stats and unlockable tags
//! - `settings`: Player preferences and difficulty selection
//! - `session`: Session controller tying the simulation to its collaborators

pub mod achievements;
pub mod audio;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use achievements::Stats;
pub use session::Session;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz animation frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Default viewport used when the host does not report one
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 20.0;
    pub const PLAYER_HEIGHT: f32 = 30.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_JUMP_FORCE: f32 = 12.0;
    pub const PLAYER_GRAVITY: f32 = 0.8;
    pub const PLAYER_MAX_SPEED: f32 = 6.0;
    pub const PLAYER_FRICTION: f32 = 0.85;
    /// Spawn point: x from the left edge, y measured up from the bottom edge
    pub const SPAWN_X: f32 = 50.0;
    pub const SPAWN_HEIGHT_FROM_BOTTOM: f32 = 100.0;

    /// Horizontal velocities below this snap to zero
    pub const VELOCITY_EPSILON: f32 = 0.1;
    /// How far below the viewport the player may drop before dying
    pub const FALL_MARGIN: f32 = 100.0;
    /// Landing/ceiling edge tolerance
    pub const EDGE_TOLERANCE: f32 = 5.0;
    /// Height of the band above a moving platform that still counts as standing on it
    pub const RIDE_BAND: f32 = 10.0;
    /// Fraction of a moving platform's per-tick displacement given to its rider
    pub const RIDE_CARRY: f32 = 0.5;

    /// Ticks between death and respawn (1.25 s at 60 Hz)
    pub const RESPAWN_DELAY_TICKS: u32 = 75;

    /// Goal pulse speed (radians per second)
    pub const GOAL_PULSE_RATE: f32 = 10.0;
}
