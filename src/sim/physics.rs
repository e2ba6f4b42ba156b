//! Player kinematics
//!
//! Per-tick Euler integration in units per tick. No substepping: a fast enough
//! player can pass through a thin platform, and that is accepted.

use super::state::{Player, Viewport};
use super::tick::TickInput;
use crate::consts::{FALL_MARGIN, VELOCITY_EPSILON};

/// What the stepper observed this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// A jump started this tick
    pub jumped: bool,
    /// The player dropped out of the world
    pub fell: bool,
}

/// Advance the player by one tick of input, gravity and velocity
pub fn step_player(player: &mut Player, input: &TickInput, viewport: Viewport) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    let tuning = player.tuning;

    // Horizontal: instant speed while exactly one direction is held
    match (input.left, input.right) {
        (true, false) => {
            player.vel.x = -tuning.speed;
            player.facing = -1.0;
        }
        (false, true) => {
            player.vel.x = tuning.speed;
            player.facing = 1.0;
        }
        _ => {
            player.vel.x *= tuning.friction;
            if player.vel.x.abs() < VELOCITY_EPSILON {
                player.vel.x = 0.0;
            }
        }
    }

    // Vertical: only a fresh press starts a jump, and only from the ground
    if input.jump_pressed && !player.is_jumping {
        player.vel.y = -tuning.jump_force;
        player.is_jumping = true;
        outcome.jumped = true;
    }

    player.vel.y += tuning.gravity;
    player.pos += player.vel;

    player.clamp_x(viewport.width);

    if player.pos.y > viewport.height + FALL_MARGIN {
        outcome.fell = true;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn viewport() -> Viewport {
        Viewport::new(1280.0, 720.0)
    }

    #[test]
    fn test_direction_sets_speed_and_facing() {
        let mut player = Player::new(Vec2::new(100.0, 100.0));
        let input = TickInput {
            left: true,
            ..Default::default()
        };
        step_player(&mut player, &input, viewport());
        assert_eq!(player.vel.x, -5.0);
        assert_eq!(player.facing, -1.0);
        assert_eq!(player.pos.x, 95.0);

        let input = TickInput {
            right: true,
            ..Default::default()
        };
        step_player(&mut player, &input, viewport());
        assert_eq!(player.vel.x, 5.0);
        assert_eq!(player.facing, 1.0);
    }

    #[test]
    fn test_both_directions_cancel() {
        let mut player = Player::new(Vec2::new(100.0, 100.0));
        player.vel.x = 4.0;
        let input = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        step_player(&mut player, &input, viewport());
        assert!((player.vel.x - 3.4).abs() < 1e-5);
    }

    #[test]
    fn test_gravity_always_applies() {
        let mut player = Player::new(Vec2::new(100.0, 100.0));
        step_player(&mut player, &TickInput::default(), viewport());
        assert!((player.vel.y - 0.8).abs() < 1e-6);
        assert!((player.pos.y - 100.8).abs() < 1e-4);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut player = Player::new(Vec2::new(100.0, 300.0));
        let jump = TickInput {
            jump_pressed: true,
            ..Default::default()
        };
        let outcome = step_player(&mut player, &jump, viewport());
        assert!(outcome.jumped);
        assert!(player.is_jumping);
        assert!((player.vel.y - (-12.0 + 0.8)).abs() < 1e-5);

        // Still airborne: a second press does nothing
        let before = player.vel.y;
        let outcome = step_player(&mut player, &jump, viewport());
        assert!(!outcome.jumped);
        assert!((player.vel.y - (before + 0.8)).abs() < 1e-5);
    }

    #[test]
    fn test_horizontal_clamp() {
        let mut player = Player::new(Vec2::new(2.0, 100.0));
        let left = TickInput {
            left: true,
            ..Default::default()
        };
        step_player(&mut player, &left, viewport());
        assert_eq!(player.pos.x, 0.0);

        player.pos.x = 1258.0;
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        step_player(&mut player, &right, viewport());
        assert_eq!(player.pos.x, 1260.0);
    }

    #[test]
    fn test_fall_off_world() {
        let mut player = Player::new(Vec2::new(100.0, 815.0));
        let outcome = step_player(&mut player, &TickInput::default(), viewport());
        assert!(!outcome.fell);
        player.pos.y = 821.0;
        let outcome = step_player(&mut player, &TickInput::default(), viewport());
        assert!(outcome.fell);
    }

    proptest! {
        #[test]
        fn prop_friction_decays_to_exact_zero(vx in -6.0f32..6.0) {
            let mut player = Player::new(Vec2::new(600.0, 100.0));
            player.vel.x = vx;
            let mut previous = vx.abs();
            for _ in 0..200 {
                step_player(&mut player, &TickInput::default(), viewport());
                let now = player.vel.x.abs();
                prop_assert!(now < previous || now == 0.0);
                previous = now;
                if now == 0.0 {
                    break;
                }
            }
            prop_assert_eq!(player.vel.x, 0.0);
        }
    }
}
