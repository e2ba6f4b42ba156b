//! Level generation
//!
//! One generator for every layout. The classic layout reproduces the hand-built
//! stage; the random layout draws the same building blocks from a seeded RNG,
//! steered by the knobs in [`LevelConfig`]. Nothing here checks that a level can
//! actually be finished: hellish configs are allowed to be unfair.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rect::Rect;
use super::state::{
    Goal, Level, MovingPlatform, Platform, PlatformKind, SawAxis, SawBlade, Spike, Viewport,
};
use crate::consts::DEFAULT_VIEWPORT_WIDTH;

/// Ground slab thickness
pub const GROUND_HEIGHT: f32 = 40.0;
/// The main path starts this far above the bottom edge
pub const PATH_BASE_OFFSET: f32 = 200.0;
/// First stepping stone x
pub const FIRST_STEP_X: f32 = 300.0;
pub const SPIKE_WIDTH: f32 = 30.0;
pub const SPIKE_HEIGHT: f32 = 25.0;
pub const MOVING_PLATFORM_WIDTH: f32 = 80.0;
pub const MOVING_PLATFORM_HEIGHT: f32 = 15.0;
pub const GOAL_WIDTH: f32 = 40.0;
pub const GOAL_HEIGHT: f32 = 60.0;
/// Steps never climb higher than this from the top edge
const MIN_STEP_Y: f32 = 120.0;

/// Errors raised while building a level
#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
    #[error("moving platform {index} has bad bounds: x={x}, range=[{min_x}, {max_x}]")]
    InvalidMovingPlatform {
        index: usize,
        x: f32,
        min_x: f32,
        max_x: f32,
    },
    #[error("saw blade {index} has an empty travel range [{min}, {max}]")]
    InvalidSawRange { index: usize, min: f32, max: f32 },
}

/// What an unresolved side contact with a platform does to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HorizontalContact {
    /// Push the player out along x
    #[default]
    PushOut,
    /// Walls kill
    Lethal,
}

/// Which layout the generator builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelLayout {
    /// The fixed hand-built stage
    #[default]
    Classic,
    /// Seeded random placement driven by the config knobs
    Random,
}

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hellish,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hellish => "Hellish",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hellish" | "hell" => Some(Difficulty::Hellish),
            _ => None,
        }
    }

    /// Generator knobs for this preset
    pub fn config(&self, layout: LevelLayout) -> LevelConfig {
        let base = LevelConfig {
            layout,
            ..LevelConfig::default()
        };
        match self {
            Difficulty::Easy => LevelConfig {
                gap_chance: 0.0,
                spike_chance: 0.15,
                moving_platforms: 1,
                moving_speed: 1.5,
                saw_blades: 0,
                guard_spikes: false,
                ..base
            },
            Difficulty::Normal => base,
            Difficulty::Hellish => LevelConfig {
                step_width: 60.0,
                gap_jitter: 30.0,
                gap_chance: 0.35,
                allow_double_gaps: true,
                spike_chance: 0.6,
                moving_platforms: 2,
                moving_speed: 3.0,
                saw_blades: 3,
                saw_speed: 2.5,
                horizontal_contact: HorizontalContact::Lethal,
                ..base
            },
        }
    }
}

/// Generator knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub layout: LevelLayout,
    /// Number of stepping-stone slots
    pub steps: u32,
    pub step_width: f32,
    pub step_height: f32,
    /// Horizontal distance between step slots
    pub gap: f32,
    /// Random +/- offset applied to each step's x
    pub gap_jitter: f32,
    /// Height gained per step
    pub rise: f32,
    /// Probability a middle step is left out
    pub gap_chance: f32,
    /// Whether two neighbouring steps may both be left out
    pub allow_double_gaps: bool,
    /// Probability a placed step carries a spike
    pub spike_chance: f32,
    pub moving_platforms: u32,
    /// Moving platform speed (units/tick)
    pub moving_speed: f32,
    pub saw_blades: u32,
    /// Saw travel speed (units/tick)
    pub saw_speed: f32,
    /// Spikes flanking the goal ledge
    pub guard_spikes: bool,
    pub horizontal_contact: HorizontalContact,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            layout: LevelLayout::Classic,
            steps: 8,
            step_width: 80.0,
            step_height: 20.0,
            gap: 150.0,
            gap_jitter: 0.0,
            rise: 40.0,
            gap_chance: 0.2,
            allow_double_gaps: false,
            spike_chance: 0.35,
            moving_platforms: 1,
            moving_speed: 2.0,
            saw_blades: 0,
            saw_speed: 1.5,
            guard_spikes: true,
            horizontal_contact: HorizontalContact::PushOut,
        }
    }
}

impl LevelConfig {
    /// The hand-built stage with push-out walls
    pub fn classic() -> Self {
        Self::default()
    }
}

/// Build a level for `viewport`
pub fn generate(viewport: Viewport, config: &LevelConfig, seed: u64) -> Result<Level, LevelError> {
    if !viewport.is_valid() {
        return Err(LevelError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }

    let level = match config.layout {
        LevelLayout::Classic => classic_layout(viewport),
        LevelLayout::Random => random_layout(viewport, config, seed),
    };
    validate(&level)?;

    log::info!(
        "Generated {:?} level (seed {}): {} platforms, {} moving, {} spikes, {} saws",
        config.layout,
        seed,
        level.platforms.len(),
        level.moving_platforms.len(),
        level.spikes.len(),
        level.saws.len()
    );
    Ok(level)
}

/// Like [`generate`], but a failed generation degrades to the classic stage
pub fn generate_or_classic(viewport: Viewport, config: &LevelConfig, seed: u64) -> Level {
    match generate(viewport, config, seed) {
        Ok(level) => level,
        Err(e) => {
            log::warn!("Level generation failed ({e}), falling back to classic layout");
            classic_layout(viewport)
        }
    }
}

/// Check the invariants the tick relies on
pub fn validate(level: &Level) -> Result<(), LevelError> {
    for (index, platform) in level.moving_platforms.iter().enumerate() {
        let x = platform.rect.x;
        let bounds_ok = platform.min_x < platform.max_x;
        let start_ok = x >= platform.min_x && x <= platform.max_x;
        if !bounds_ok || !start_ok || !x.is_finite() {
            return Err(LevelError::InvalidMovingPlatform {
                index,
                x,
                min_x: platform.min_x,
                max_x: platform.max_x,
            });
        }
    }
    for (index, saw) in level.saws.iter().enumerate() {
        if saw.min >= saw.max {
            return Err(LevelError::InvalidSawRange {
                index,
                min: saw.min,
                max: saw.max,
            });
        }
    }
    Ok(())
}

/// The fixed hand-placed stage
///
/// Laid out for a 1280 wide screen. Narrower screens squeeze every x position
/// (not the sizes) so the goal stays on screen.
pub fn classic_layout(viewport: Viewport) -> Level {
    let (w, h) = (viewport.width, viewport.height);
    let path_y = h - PATH_BASE_OFFSET;
    let sx = (w / DEFAULT_VIEWPORT_WIDTH).min(1.0);

    let mut platforms = vec![
        Platform::new(Rect::new(0.0, h - GROUND_HEIGHT, w, GROUND_HEIGHT), PlatformKind::Ground),
        Platform::new(Rect::new(0.0, path_y, 200.0, 20.0), PlatformKind::Start),
    ];
    let mut spikes = Vec::new();

    let (step_width, step_height, gap) = (80.0, 20.0, 150.0);
    for i in 0..8 {
        let x = (FIRST_STEP_X + i as f32 * gap) * sx;
        let y = path_y - i as f32 * 40.0;
        if i != 3 && i != 6 {
            platforms.push(Platform::new(
                Rect::new(x, y, step_width, step_height),
                PlatformKind::Step,
            ));
        }
        if i == 2 || i == 4 || i == 7 {
            spikes.push(Spike {
                rect: Rect::new(
                    x + step_width / 2.0 - SPIKE_WIDTH / 2.0,
                    y - SPIKE_HEIGHT,
                    SPIKE_WIDTH,
                    SPIKE_HEIGHT,
                ),
            });
        }
    }

    platforms.push(Platform::new(
        Rect::new(300.0 * sx, path_y - 120.0, 100.0, 15.0),
        PlatformKind::Static,
    ));
    platforms.push(Platform::new(
        Rect::new(750.0 * sx, path_y - 160.0, 100.0, 15.0),
        PlatformKind::Static,
    ));
    platforms.push(Platform::new(
        Rect::new(900.0 * sx, path_y - 240.0, 120.0, 15.0),
        PlatformKind::GoalLedge,
    ));

    // Keep room to travel once squeezed
    let min_x = 450.0 * sx;
    let max_x = (700.0 * sx).max(min_x + MOVING_PLATFORM_WIDTH + 40.0);
    let moving_platforms = vec![MovingPlatform {
        rect: Rect::new(min_x, path_y - 80.0, MOVING_PLATFORM_WIDTH, MOVING_PLATFORM_HEIGHT),
        speed: 2.0,
        direction: 1.0,
        min_x,
        max_x,
    }];

    // Guards around the goal column
    for x in [1000.0, 1100.0] {
        spikes.push(Spike {
            rect: Rect::new(x * sx, path_y - SPIKE_HEIGHT, 40.0, SPIKE_HEIGHT),
        });
    }

    Level {
        platforms,
        moving_platforms,
        spikes,
        saws: Vec::new(),
        goal: Goal {
            rect: Rect::new(1050.0 * sx, path_y - 300.0, GOAL_WIDTH, GOAL_HEIGHT),
            pulse: 0.0,
        },
    }
}

/// A placed stepping stone: (slot index, rect)
type Step = (usize, Rect);

fn random_layout(viewport: Viewport, config: &LevelConfig, seed: u64) -> Level {
    let mut rng = Pcg32::seed_from_u64(seed);
    let (w, h) = (viewport.width, viewport.height);
    let path_y = h - PATH_BASE_OFFSET;
    let steps = config.steps.max(2) as usize;

    // Squeeze the path so the goal ledge still fits on screen
    let ledge_width = 120.0;
    let room = (w - FIRST_STEP_X - ledge_width - 40.0).max(config.step_width);
    let gap = config
        .gap
        .min(room / steps as f32)
        .max(config.step_width + 10.0);
    let rise = config
        .rise
        .min(((path_y - MIN_STEP_Y - 120.0) / steps as f32).max(0.0));

    let mut platforms = vec![
        Platform::new(Rect::new(0.0, h - GROUND_HEIGHT, w, GROUND_HEIGHT), PlatformKind::Ground),
        Platform::new(Rect::new(0.0, path_y, 200.0, 20.0), PlatformKind::Start),
    ];
    let mut spikes = Vec::new();
    let mut placed: Vec<Step> = Vec::with_capacity(steps);
    let mut skipped: Vec<usize> = Vec::new();

    let mut previous_skipped = false;
    for i in 0..steps {
        let is_middle = i > 0 && i + 1 < steps;
        let may_skip = is_middle && (config.allow_double_gaps || !previous_skipped);
        if may_skip && rng.random_bool(config.gap_chance.clamp(0.0, 1.0) as f64) {
            skipped.push(i);
            previous_skipped = true;
            continue;
        }
        previous_skipped = false;

        let jitter = if config.gap_jitter > 0.0 {
            rng.random_range(-config.gap_jitter..=config.gap_jitter)
        } else {
            0.0
        };
        let x = (FIRST_STEP_X + i as f32 * gap + jitter)
            .min(w - config.step_width)
            .max(0.0);
        let y = (path_y - i as f32 * rise).max(MIN_STEP_Y);
        let rect = Rect::new(x, y, config.step_width, config.step_height);
        platforms.push(Platform::new(rect, PlatformKind::Step));
        placed.push((i, rect));

        if i > 0 && rng.random_bool(config.spike_chance.clamp(0.0, 1.0) as f64) {
            spikes.push(spike_on(&rect));
        }
    }

    // Goal ledge one slot past the last step, kept on screen
    let (last_index, last_rect) = placed.last().copied().unwrap_or((0, platforms[1].rect));
    let ledge_x = (FIRST_STEP_X + (last_index + 1) as f32 * gap).min(w - ledge_width - 20.0);
    let ledge_y = (last_rect.y - rise * 2.0).max(MIN_STEP_Y - 40.0);
    let ledge = Rect::new(ledge_x, ledge_y, ledge_width, 15.0);
    platforms.push(Platform::new(ledge, PlatformKind::GoalLedge));

    let goal = Goal {
        rect: Rect::new(
            ledge.right() - GOAL_WIDTH - 10.0,
            ledge.y - GOAL_HEIGHT,
            GOAL_WIDTH,
            GOAL_HEIGHT,
        ),
        pulse: 0.0,
    };

    if config.guard_spikes {
        let guard_y = h - GROUND_HEIGHT - SPIKE_HEIGHT;
        for x in [ledge.x - 50.0, ledge.right() + 10.0] {
            if x >= 0.0 && x + 40.0 <= w {
                spikes.push(Spike {
                    rect: Rect::new(x, guard_y, 40.0, SPIKE_HEIGHT),
                });
            }
        }
    }

    // Moving platforms bridge skipped slots first, then random slots
    let mut moving_platforms = Vec::new();
    for k in 0..config.moving_platforms as usize {
        let slot = match skipped.get(k) {
            Some(&slot) => slot,
            None => rng.random_range(0..steps),
        };
        let min_x = FIRST_STEP_X + slot as f32 * gap - gap * 0.5;
        let min_x = min_x.clamp(0.0, (w - MOVING_PLATFORM_WIDTH * 2.0).max(0.0));
        let max_x = (min_x + gap * 1.5 + MOVING_PLATFORM_WIDTH).min(w);
        let y = (path_y - slot as f32 * rise - 80.0).max(MIN_STEP_Y);
        let x = rng.random_range(min_x..=(max_x - MOVING_PLATFORM_WIDTH).max(min_x));
        moving_platforms.push(MovingPlatform {
            rect: Rect::new(x, y, MOVING_PLATFORM_WIDTH, MOVING_PLATFORM_HEIGHT),
            speed: config.moving_speed,
            direction: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
            min_x,
            max_x,
        });
    }

    // Saws sit in the air between neighbouring slots
    let mut saws = Vec::new();
    for _ in 0..config.saw_blades {
        let slot = rng.random_range(0..steps.saturating_sub(1).max(1));
        let center_x = FIRST_STEP_X + slot as f32 * gap + config.step_width + (gap - config.step_width) / 2.0;
        let center_y = (path_y - slot as f32 * rise - 60.0).max(MIN_STEP_Y);
        let radius = rng.random_range(18.0..=26.0);
        let axis = if rng.random_bool(0.5) {
            SawAxis::Vertical
        } else {
            SawAxis::Horizontal
        };
        let (coord, span) = match axis {
            SawAxis::Horizontal => (center_x, gap * 0.5),
            SawAxis::Vertical => (center_y, 60.0),
        };
        saws.push(SawBlade {
            center: Vec2::new(center_x, center_y),
            radius,
            angular_speed: 0.2,
            angle: 0.0,
            axis,
            min: coord - span,
            max: coord + span,
            speed: config.saw_speed,
            direction: 1.0,
        });
    }

    Level {
        platforms,
        moving_platforms,
        spikes,
        saws,
        goal,
    }
}

/// A spike centered on top of a step, narrower than the step
fn spike_on(step: &Rect) -> Spike {
    let width = SPIKE_WIDTH.min(step.width * 0.5);
    Spike {
        rect: Rect::new(
            step.x + step.width / 2.0 - width / 2.0,
            step.y - SPIKE_HEIGHT,
            width,
            SPIKE_HEIGHT,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_config(difficulty: Difficulty) -> LevelConfig {
        difficulty.config(LevelLayout::Random)
    }

    #[test]
    fn test_classic_layout_matches_stage() {
        let viewport = Viewport::new(1280.0, 720.0);
        let level = generate(viewport, &LevelConfig::classic(), 0).unwrap();

        let ground = &level.platforms[0];
        assert_eq!(ground.kind, PlatformKind::Ground);
        assert_eq!(ground.rect, Rect::new(0.0, 680.0, 1280.0, 40.0));

        let steps = level
            .platforms
            .iter()
            .filter(|p| p.kind == PlatformKind::Step)
            .count();
        assert_eq!(steps, 6);
        assert_eq!(level.spikes.len(), 5);
        assert_eq!(level.moving_platforms.len(), 1);
        assert_eq!(level.moving_platforms[0].min_x, 450.0);
        assert_eq!(level.moving_platforms[0].max_x, 700.0);
        assert_eq!(level.goal.rect, Rect::new(1050.0, 220.0, 40.0, 60.0));
        assert!(level.saws.is_empty());
    }

    #[test]
    fn test_classic_squeezes_onto_narrow_screens() {
        let viewport = Viewport::new(400.0, 800.0);
        let level = generate(viewport, &LevelConfig::classic(), 0).unwrap();
        assert!(level.goal.rect.right() <= viewport.width);
        assert!(level.goal.rect.left() >= 0.0);

        let moving = &level.moving_platforms[0];
        assert!(moving.max_x - moving.min_x > moving.rect.width);
    }

    #[test]
    fn test_ground_spans_viewport() {
        for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hellish] {
            let viewport = Viewport::new(900.0, 600.0);
            let level = generate(viewport, &random_config(difficulty), 3).unwrap();
            let ground = &level.platforms[0];
            assert_eq!(ground.rect.x, 0.0);
            assert_eq!(ground.rect.width, 900.0);
        }
    }

    #[test]
    fn test_random_layout_is_deterministic() {
        let viewport = Viewport::default();
        let config = random_config(Difficulty::Hellish);
        let a = generate(viewport, &config, 42).unwrap();
        let b = generate(viewport, &config, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_layouts_hold_invariants() {
        let viewport = Viewport::new(1280.0, 720.0);
        for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hellish] {
            let config = random_config(difficulty);
            for seed in 0..64 {
                let level = generate(viewport, &config, seed).unwrap();
                for platform in &level.moving_platforms {
                    assert!(platform.min_x < platform.max_x);
                    assert!(platform.rect.x >= platform.min_x && platform.rect.x <= platform.max_x);
                }
                assert_eq!(level.moving_platforms.len(), config.moving_platforms as usize);
                assert_eq!(level.saws.len(), config.saw_blades as usize);

                // Spikes never swallow a whole step
                for spike in &level.spikes {
                    for platform in &level.platforms {
                        assert!(!spike.rect.contains_rect(&platform.rect));
                    }
                }

                // Goal stands on its ledge
                let ledge = level
                    .platforms
                    .iter()
                    .find(|p| p.kind == PlatformKind::GoalLedge)
                    .unwrap();
                assert_eq!(level.goal.rect.bottom(), ledge.rect.top());
                assert!(level.goal.rect.right() <= viewport.width);
            }
        }
    }

    #[test]
    fn test_easy_never_skips_steps() {
        let config = random_config(Difficulty::Easy);
        let level = generate(Viewport::default(), &config, 9).unwrap();
        let steps = level
            .platforms
            .iter()
            .filter(|p| p.kind == PlatformKind::Step)
            .count();
        assert_eq!(steps, config.steps as usize);
    }

    #[test]
    fn test_invalid_viewport_rejected() {
        let err = generate(Viewport::new(0.0, 720.0), &LevelConfig::classic(), 0).unwrap_err();
        assert!(matches!(err, LevelError::InvalidViewport { .. }));

        let err = generate(Viewport::new(f32::NAN, 720.0), &LevelConfig::classic(), 0).unwrap_err();
        assert!(matches!(err, LevelError::InvalidViewport { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_moving_platform() {
        let mut level = classic_layout(Viewport::default());
        level.moving_platforms[0].min_x = 700.0;
        level.moving_platforms[0].max_x = 450.0;
        assert!(matches!(
            validate(&level),
            Err(LevelError::InvalidMovingPlatform { index: 0, .. })
        ));

        let mut level = classic_layout(Viewport::default());
        level.moving_platforms[0].rect.x = 800.0;
        assert!(validate(&level).is_err());
    }

    #[test]
    fn test_generate_or_classic_falls_back() {
        let level = generate_or_classic(Viewport::new(-1.0, 720.0), &random_config(Difficulty::Normal), 5);
        assert_eq!(level.goal.rect.x, 1050.0);
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!(Difficulty::from_str("HELLISH"), Some(Difficulty::Hellish));
        assert_eq!(Difficulty::from_str("easy"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_str("nightmare"), None);
        assert_eq!(
            Difficulty::Hellish.config(LevelLayout::Random).horizontal_contact,
            HorizontalContact::Lethal
        );
    }
}
