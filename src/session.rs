//! Session controller
//!
//! Owns the simulation state and its collaborators (audio, persistence,
//! stats, settings). The host feeds it frame deltas and polled input; it runs
//! fixed timestep ticks and reacts to the events each tick produced. Nothing a
//! collaborator does can stop gameplay: storage failures are logged and
//! dropped, sound is fire-and-forget.

use glam::Vec2;

use crate::achievements::{Achievement, Stats};
use crate::audio::{AudioCue, AudioSink};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::persistence::{SaveSystem, Snapshot};
use crate::platform::storage::KeyValueStore;
use crate::settings::Settings;
use crate::sim::tick::toggle_pause;
use crate::sim::{
    GameEvent, GameState, Level, Particle, Player, SessionPhase, TickInput, Viewport, tick,
};

/// Longest frame delta accepted before clamping (seconds)
const MAX_FRAME_DT: f32 = 0.1;

/// Counters for the HUD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudSnapshot {
    pub deaths: u32,
    /// Seconds
    pub elapsed: f32,
    pub won: bool,
    pub phase: SessionPhase,
    pub muted: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub viewport: Viewport,
    pub player: &'a Player,
    pub level: &'a Level,
    pub particles: &'a [Particle],
    pub hud: HudSnapshot,
}

/// A play session
pub struct Session {
    state: GameState,
    accumulator: f32,
    audio: Box<dyn AudioSink>,
    saves: SaveSystem,
    stats: Stats,
    settings: Settings,
    /// Unlocks not yet shown by the host
    unlocked: Vec<Achievement>,
    /// One-shot presses waiting for the next tick
    pending: TickInput,
}

impl Session {
    /// Build a session, loading settings and stats from `store`
    pub fn new(
        viewport: Viewport,
        seed: u64,
        store: Box<dyn KeyValueStore>,
        mut audio: Box<dyn AudioSink>,
    ) -> Self {
        let viewport = if viewport.is_valid() {
            viewport
        } else {
            log::warn!(
                "Invalid viewport {}x{}, using default",
                viewport.width,
                viewport.height
            );
            Viewport::default()
        };

        let saves = SaveSystem::new(store);
        let settings = Settings::load(saves.store());
        let stats = Stats::load(saves.store());

        let (master, sfx) = settings.volumes();
        audio.set_volume(master, sfx);
        audio.set_muted(settings.muted);

        let state = GameState::new(viewport, settings.level_config(), seed);
        log::info!(
            "Session created: {} difficulty, {:?} layout, {} obstacles (seed {})",
            settings.difficulty.as_str(),
            settings.layout,
            state.level.obstacle_count(),
            seed
        );

        Self {
            state,
            accumulator: 0.0,
            audio,
            saves,
            stats,
            settings,
            unlocked: Vec::new(),
            pending: TickInput::default(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for editors and scripted scenarios
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    /// Idle -> Running
    pub fn start(&mut self) {
        if self.state.phase == SessionPhase::Idle {
            self.state.phase = SessionPhase::Running;
            log::info!("Session started");
        }
    }

    /// Freeze the simulation (Running or Dead only)
    pub fn pause(&mut self) {
        if matches!(
            self.state.phase,
            SessionPhase::Running | SessionPhase::Dead { .. }
        ) {
            toggle_pause(&mut self.state);
            self.on_paused();
        }
    }

    pub fn resume(&mut self) {
        if self.state.phase.is_paused() {
            toggle_pause(&mut self.state);
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.state.phase.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// New level, counters zeroed, player back at spawn; waits for `start`
    pub fn reset(&mut self) {
        let seed = self.state.seed.wrapping_add(1);
        self.reset_with_seed(seed);
    }

    pub fn reset_with_seed(&mut self, seed: u64) {
        self.state.config = self.settings.level_config();
        self.state.reset(seed);
        self.accumulator = 0.0;
        self.pending = TickInput::default();
        log::info!(
            "Level reset (seed {}, {} obstacles)",
            seed,
            self.state.level.obstacle_count()
        );

        let spawn = self.state.viewport.spawn_point();
        if let Err(e) = self.saves.set_checkpoint(spawn.x, spawn.y) {
            log::warn!("Could not store checkpoint: {}", e);
        }
    }

    /// Reset and start right away
    pub fn restart(&mut self) {
        self.reset();
        self.start();
    }

    /// Advance by one host frame; returns the number of ticks run
    pub fn update(&mut self, frame_dt: f32, input: TickInput) -> u32 {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += frame_dt;

        // Presses survive frames too short to run a tick
        self.pending.jump_pressed |= input.jump_pressed;
        self.pending.pause |= input.pause;

        let was_paused = self.state.phase.is_paused();
        let elapsed_before = self.state.elapsed;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            // One-shot inputs only reach the first substep
            let step_input = TickInput {
                jump_pressed: self.pending.jump_pressed,
                pause: self.pending.pause,
                ..input.held_only()
            };
            self.pending = TickInput::default();
            tick(&mut self.state, &step_input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            if !self.settings.effective_particles() {
                self.state.particles.clear();
            }
            if self.settings.reduced_motion {
                self.state.level.goal.pulse = 0.0;
            }
            self.dispatch_events();
        }

        // Drop the backlog instead of spiralling
        if substeps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }

        let played = self.state.elapsed - elapsed_before;
        if played > 0.0 {
            let unlocked = self.stats.add_play_time(played);
            self.announce(unlocked, true);
        }

        if !was_paused && self.state.phase.is_paused() {
            self.on_paused();
        }

        substeps
    }

    /// HUD counters
    pub fn snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            deaths: self.state.death_count,
            elapsed: self.state.elapsed,
            won: self.state.won,
            phase: self.state.phase,
            muted: self.audio.is_muted(),
        }
    }

    /// Read-only view for the renderer
    pub fn frame(&self) -> FrameView<'_> {
        FrameView {
            viewport: self.state.viewport,
            player: &self.state.player,
            level: &self.state.level,
            particles: &self.state.particles,
            hud: self.snapshot(),
        }
    }

    /// Achievements unlocked since the last call
    pub fn take_unlocked(&mut self) -> Vec<Achievement> {
        std::mem::take(&mut self.unlocked)
    }

    /// What the save slot would store right now
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            player_x: self.state.player.pos.x,
            player_y: self.state.player.pos.y,
            death_count: self.state.death_count,
            elapsed_time: self.state.elapsed,
            achievements: self.stats.achievements.clone(),
        }
    }

    /// Write the save slot and stats; false if the slot could not be written
    pub fn save(&mut self) -> bool {
        self.stats.save(self.saves.store_mut());
        match self.saves.save(&self.to_snapshot()) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Could not save game: {}", e);
                false
            }
        }
    }

    /// Restore counters, position and achievements from a snapshot
    pub fn load_snapshot(&mut self, snapshot: &Snapshot) {
        let pos = self.sanitize_position(snapshot.player_x, snapshot.player_y);
        self.state.player.reset_at(pos);
        self.state.death_count = snapshot.death_count;
        self.state.elapsed = if snapshot.elapsed_time.is_finite() {
            snapshot.elapsed_time.max(0.0)
        } else {
            0.0
        };
        for tag in &snapshot.achievements {
            if !self.stats.achievements.contains(tag) {
                self.stats.achievements.push(tag.clone());
            }
        }
        self.accumulator = 0.0;
        log::info!(
            "Snapshot loaded ({} deaths, {:.0}s)",
            snapshot.death_count,
            snapshot.elapsed_time
        );
    }

    /// Load the save slot and checkpoint; false if there is no save
    pub fn load(&mut self) -> bool {
        let Some(snapshot) = self.saves.load() else {
            log::info!("No saved game found");
            return false;
        };
        self.load_snapshot(&snapshot);
        if let Some(checkpoint) = self.saves.checkpoint() {
            self.state.checkpoint = Some(self.sanitize_position(checkpoint.x, checkpoint.y));
        }
        true
    }

    /// Forget the save slot and checkpoint
    pub fn clear_save(&mut self) {
        if let Err(e) = self.saves.clear() {
            log::warn!("Could not clear save: {}", e);
        }
    }

    /// Flip mute and remember it; returns the new state
    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.audio.toggle_mute();
        self.settings.muted = muted;
        self.settings.save(self.saves.store_mut());
        if !muted {
            self.audio.play(AudioCue::Click);
        }
        muted
    }

    /// Replace settings; level changes take effect on the next reset
    pub fn apply_settings(&mut self, settings: Settings) {
        let (master, sfx) = settings.volumes();
        self.audio.set_volume(master, sfx);
        self.audio.set_muted(settings.muted);
        settings.save(self.saves.store_mut());
        self.settings = settings;
    }

    /// Keep a restored position inside the viewport
    fn sanitize_position(&self, x: f32, y: f32) -> Vec2 {
        let viewport = self.state.viewport;
        let size = self.state.player.size;
        if !x.is_finite() || !y.is_finite() {
            return viewport.spawn_point();
        }
        Vec2::new(
            x.clamp(0.0, (viewport.width - size.x).max(0.0)),
            y.clamp(0.0, (viewport.height - size.y).max(0.0)),
        )
    }

    fn on_paused(&mut self) {
        log::debug!("Paused, saving");
        self.save();
    }

    fn announce(&mut self, unlocked: Vec<Achievement>, play_cue: bool) {
        if unlocked.is_empty() {
            return;
        }
        if play_cue {
            self.audio.play(AudioCue::Achievement);
        }
        self.unlocked.extend(unlocked);
    }

    /// React to everything the last tick produced
    fn dispatch_events(&mut self) {
        for event in self.state.take_events() {
            match event {
                GameEvent::Jumped => self.audio.play(AudioCue::Jump),
                GameEvent::Landed => self.audio.play(AudioCue::Landing),
                GameEvent::Died(_) => {
                    self.audio.play(AudioCue::Death);
                    let unlocked = self.stats.add_death();
                    self.announce(unlocked, true);
                    self.stats.save(self.saves.store_mut());
                }
                GameEvent::Respawned => {}
                GameEvent::Checkpoint { x, y } => {
                    if let Err(e) = self.saves.set_checkpoint(x, y) {
                        log::warn!("Could not store checkpoint: {}", e);
                    }
                }
                GameEvent::Won => {
                    self.audio.play(AudioCue::Achievement);
                    let unlocked = self.stats.record_win();
                    // The win cue already covers these
                    self.announce(unlocked, false);
                    self.save();
                }
            }
        }
    }
}
