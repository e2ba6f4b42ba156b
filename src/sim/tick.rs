//! Fixed timestep simulation tick
//!
//! Core game loop that advances the session one step. Order inside a running
//! tick: player physics, obstacle motion, collision pass, death/win, counters.

use glam::Vec2;

use super::collision::resolve_collisions;
use super::physics::step_player;
use super::state::{DeathCause, GameEvent, GameState, ParticleKind, SessionPhase};
use crate::consts::RESPAWN_DELAY_TICKS;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Move left held
    pub left: bool,
    /// Move right held
    pub right: bool,
    /// Jump was pressed since the previous tick (rising edge only)
    pub jump_pressed: bool,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    /// Copy with the one-shot fields cleared, for extra substeps in the same frame
    pub fn held_only(&self) -> Self {
        Self {
            jump_pressed: false,
            pause: false,
            ..*self
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        toggle_pause(state);
    }

    match state.phase {
        SessionPhase::Idle | SessionPhase::Paused { .. } => {}

        SessionPhase::Won => {
            // Celebration keeps animating, gameplay is over
            state.level.advance(dt);
            state.update_particles();
        }

        SessionPhase::Dead { respawn_ticks } => {
            state.time_ticks += 1;
            state.elapsed += dt;
            state.level.advance(dt);
            state.update_particles();

            let remaining = respawn_ticks.saturating_sub(1);
            if remaining == 0 {
                respawn(state);
            } else {
                state.phase = SessionPhase::Dead {
                    respawn_ticks: remaining,
                };
            }
        }

        SessionPhase::Running => {
            state.time_ticks += 1;
            state.elapsed += dt;

            let was_on_ground = state.player.on_ground;
            let step = step_player(&mut state.player, input, state.viewport);
            if step.jumped {
                state.events.push(GameEvent::Jumped);
            }

            state.level.advance(dt);

            let report = resolve_collisions(
                &mut state.player,
                &state.level,
                state.config.horizontal_contact,
            );
            // Push-outs and carries may not leave the screen
            state.player.clamp_x(state.viewport.width);

            if (report.landed || report.riding) && !was_on_ground {
                state.events.push(GameEvent::Landed);
                let feet = Vec2::new(state.player.center().x, state.player.bottom());
                state.spawn_burst(ParticleKind::Dust, feet, 4);
            }

            let death = report
                .death
                .or_else(|| step.fell.then_some(DeathCause::Fall));

            if let Some(cause) = death {
                kill(state, cause);
            } else if report.reached_goal && !state.won {
                win(state);
            }

            state.update_particles();
        }
    }
}

/// Pause or resume, keeping any respawn countdown
pub fn toggle_pause(state: &mut GameState) {
    state.phase = match state.phase {
        SessionPhase::Running => SessionPhase::Paused {
            respawn_ticks: None,
        },
        SessionPhase::Dead { respawn_ticks } => SessionPhase::Paused {
            respawn_ticks: Some(respawn_ticks),
        },
        SessionPhase::Paused {
            respawn_ticks: Some(respawn_ticks),
        } => SessionPhase::Dead { respawn_ticks },
        SessionPhase::Paused {
            respawn_ticks: None,
        } => SessionPhase::Running,
        other => other,
    };
}

/// Register a death and start the respawn countdown
pub fn kill(state: &mut GameState, cause: DeathCause) {
    state.death_count += 1;
    log::debug!(
        "Player died ({:?}) at ({:.1}, {:.1}), deaths: {}",
        cause,
        state.player.pos.x,
        state.player.pos.y,
        state.death_count
    );

    let center = state.player.center();
    state.spawn_burst(ParticleKind::Blood, center, 15);
    state.events.push(GameEvent::Died(cause));
    state.phase = SessionPhase::Dead {
        respawn_ticks: RESPAWN_DELAY_TICKS,
    };
}

/// Put the player back at the respawn point without touching the level
pub fn respawn(state: &mut GameState) {
    let at = state.respawn_point();
    state.player.reset_at(at);
    state.phase = SessionPhase::Running;
    state.events.push(GameEvent::Respawned);
    state.events.push(GameEvent::Checkpoint { x: at.x, y: at.y });
    log::debug!("Respawned at ({:.1}, {:.1})", at.x, at.y);
}

fn win(state: &mut GameState) {
    state.won = true;
    state.phase = SessionPhase::Won;
    state.events.push(GameEvent::Won);
    let center = state.level.goal.rect.center();
    state.spawn_burst(ParticleKind::Confetti, center, 40);
    log::info!(
        "Goal reached in {:.1}s with {} deaths",
        state.elapsed,
        state.death_count
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::level::{Difficulty, HorizontalContact, LevelConfig, LevelLayout};
    use crate::sim::rect::Rect;
    use crate::sim::state::{Platform, PlatformKind, Spike, Viewport};

    fn running_state() -> GameState {
        let mut state = GameState::new(Viewport::default(), LevelConfig::classic(), 12345);
        state.phase = SessionPhase::Running;
        state
    }

    fn count(events: &[GameEvent], wanted: GameEvent) -> usize {
        events.iter().filter(|e| **e == wanted).count()
    }

    #[test]
    fn test_idle_does_not_simulate() {
        let mut state = GameState::new(Viewport::default(), LevelConfig::classic(), 1);
        let before = state.player.pos;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.player.pos, before);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_player_settles_on_ground() {
        let mut state = running_state();
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        // Ground top is 680, player is 30 tall
        assert_eq!(state.player.pos.y, 650.0);
        assert!(state.player.on_ground);
        assert_eq!(count(&state.events, GameEvent::Landed), 1);
    }

    #[test]
    fn test_jump_fires_once_while_held() {
        let mut state = running_state();
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        state.take_events();

        // A broken edge detector would deliver jump_pressed every tick
        let held = TickInput {
            jump_pressed: true,
            ..Default::default()
        };
        let mut min_vy = f32::MAX;
        for _ in 0..10 {
            tick(&mut state, &held, SIM_DT);
            min_vy = min_vy.min(state.player.vel.y);
        }
        let events = state.take_events();
        assert_eq!(count(&events, GameEvent::Jumped), 1);
        assert!(state.player.is_jumping);
        assert!((min_vy - (-11.2)).abs() < 1e-4);
    }

    #[test]
    fn test_spike_death_fires_once() {
        let mut state = running_state();
        let spawn = state.viewport.spawn_point();
        state.level.spikes.push(Spike {
            rect: Rect::new(spawn.x - 10.0, spawn.y - 10.0, 40.0, 60.0),
        });

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.death_count, 1);
        assert!(matches!(state.phase, SessionPhase::Dead { .. }));

        for _ in 0..RESPAWN_DELAY_TICKS - 1 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            assert_eq!(state.death_count, 1);
        }
        assert!(matches!(state.phase, SessionPhase::Dead { respawn_ticks: 1 }));

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, SessionPhase::Running);
        assert_eq!(state.player.pos, spawn);
        assert_eq!(state.player.vel, Vec2::ZERO);

        let events = state.take_events();
        assert_eq!(count(&events, GameEvent::Died(DeathCause::Spike)), 1);
        assert_eq!(count(&events, GameEvent::Respawned), 1);
    }

    #[test]
    fn test_respawn_keeps_level() {
        let mut state = running_state();
        let level_before = state.level.platforms.clone();
        kill(&mut state, DeathCause::Fall);
        for _ in 0..RESPAWN_DELAY_TICKS {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.phase, SessionPhase::Running);
        assert_eq!(state.level.platforms, level_before);
    }

    #[test]
    fn test_respawn_uses_checkpoint() {
        let mut state = running_state();
        state.checkpoint = Some(Vec2::new(320.0, 400.0));
        kill(&mut state, DeathCause::Spike);
        for _ in 0..RESPAWN_DELAY_TICKS {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.player.pos, Vec2::new(320.0, 400.0));
        assert!(state.events.contains(&GameEvent::Checkpoint { x: 320.0, y: 400.0 }));
    }

    #[test]
    fn test_fall_death() {
        let mut state = running_state();
        state.level.platforms.clear();
        state.level.moving_platforms.clear();
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            if state.death_count > 0 {
                break;
            }
        }
        assert_eq!(state.death_count, 1);
        assert!(state.events.contains(&GameEvent::Died(DeathCause::Fall)));
    }

    #[test]
    fn test_win_is_idempotent() {
        let mut state = running_state();
        let goal = state.level.goal.rect;
        state.player.pos = Vec2::new(goal.x + 5.0, goal.y + 5.0);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.won);
        assert_eq!(state.phase, SessionPhase::Won);

        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(count(&state.events, GameEvent::Won), 1);
        assert_eq!(state.phase, SessionPhase::Won);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = running_state();
        tick(&mut state, &TickInput::default(), SIM_DT);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert!(state.phase.is_paused());
        let frozen = (state.player.pos, state.elapsed, state.time_ticks);

        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!((state.player.pos, state.elapsed, state.time_ticks), frozen);

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, SessionPhase::Running);
    }

    #[test]
    fn test_pause_while_dead_keeps_countdown() {
        let mut state = running_state();
        kill(&mut state, DeathCause::Spike);
        tick(&mut state, &TickInput::default(), SIM_DT);

        toggle_pause(&mut state);
        assert_eq!(
            state.phase,
            SessionPhase::Paused {
                respawn_ticks: Some(RESPAWN_DELAY_TICKS - 1)
            }
        );
        toggle_pause(&mut state);
        assert_eq!(
            state.phase,
            SessionPhase::Dead {
                respawn_ticks: RESPAWN_DELAY_TICKS - 1
            }
        );
    }

    #[test]
    fn test_reset_cancels_pending_respawn() {
        let mut state = running_state();
        kill(&mut state, DeathCause::Spike);
        state.reset(99);
        state.phase = SessionPhase::Running;
        state.player.pos = Vec2::new(200.0, 100.0);
        for _ in 0..RESPAWN_DELAY_TICKS + 5 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        // No stale respawn teleported the player back to spawn
        assert!(!state.events.contains(&GameEvent::Respawned));
        assert_eq!(state.death_count, 0);
    }

    #[test]
    fn test_lethal_walls_kill() {
        let config = LevelConfig {
            horizontal_contact: HorizontalContact::Lethal,
            ..LevelConfig::classic()
        };
        let mut state = GameState::new(Viewport::default(), config, 3);
        state.phase = SessionPhase::Running;
        // A wall standing on the ground, right of the spawn point
        state.level.platforms.push(crate::sim::state::Platform::new(
            Rect::new(100.0, 560.0, 40.0, 120.0),
            crate::sim::state::PlatformKind::Static,
        ));
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..120 {
            tick(&mut state, &right, SIM_DT);
            if state.death_count > 0 {
                break;
            }
        }
        assert!(state.events.contains(&GameEvent::Died(DeathCause::Wall)));
    }

    #[test]
    fn test_determinism() {
        let config = Difficulty::Hellish.config(LevelLayout::Random);
        let mut state1 = GameState::new(Viewport::default(), config.clone(), 99999);
        let mut state2 = GameState::new(Viewport::default(), config, 99999);
        state1.phase = SessionPhase::Running;
        state2.phase = SessionPhase::Running;

        let inputs = [
            TickInput {
                right: true,
                ..Default::default()
            },
            TickInput {
                right: true,
                jump_pressed: true,
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                left: true,
                ..Default::default()
            },
        ];

        for _ in 0..50 {
            for input in &inputs {
                tick(&mut state1, input, SIM_DT);
                tick(&mut state2, input, SIM_DT);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.player, state2.player);
        assert_eq!(state1.level, state2.level);
        assert_eq!(state1.death_count, state2.death_count);
    }

    #[test]
    fn test_standing_on_moving_platform_carries_player() {
        let mut state = running_state();
        let platform = state.level.moving_platforms[0].clone();
        let start = Vec2::new(platform.rect.x + 30.0, platform.rect.top() - 30.0);
        state.player.reset_at(start);

        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }

        // Platform moved 40, the rider gets half of that
        let moved = state.level.moving_platforms[0].rect.x - platform.rect.x;
        assert!((moved - 40.0).abs() < 1e-3);
        assert!((state.player.pos.x - (start.x + 20.0)).abs() < 1e-3);
        assert_eq!(state.player.pos.y, start.y);
        assert!(state.player.on_ground);
        assert_eq!(state.phase, SessionPhase::Running);
    }

    #[test]
    fn test_push_out_stays_on_screen() {
        let mut state = running_state();
        state.level.platforms.push(Platform::new(
            Rect::new(5.0, 0.0, 50.0, 300.0),
            PlatformKind::Static,
        ));
        state.player.reset_at(Vec2::new(0.0, 100.0));

        let right = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut state, &right, SIM_DT);
        assert_eq!(state.player.pos.x, 0.0);
    }
}
