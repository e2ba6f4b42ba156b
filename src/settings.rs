//! Game settings and preferences
//!
//! Persisted separately from game saves in the same key-value store.

use serde::{Deserialize, Serialize};

use crate::persistence::{read_json, write_json};
use crate::platform::storage::KeyValueStore;
use crate::sim::{Difficulty, HorizontalContact, LevelConfig, LevelLayout};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Level ===
    /// Preset for generator knobs
    pub difficulty: Difficulty,
    /// Hand-built stage or seeded random layout
    pub layout: LevelLayout,
    /// Overrides the preset's wall policy when set
    pub horizontal_contact: Option<HorizontalContact>,

    // === Audio ===
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Visual Effects ===
    /// Blood, dust and confetti
    pub particles: bool,

    // === Accessibility ===
    /// Reduced motion (no particles, no goal pulse)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            layout: LevelLayout::Classic,
            horizontal_contact: None,

            muted: false,
            master_volume: 0.8,
            sfx_volume: 1.0,

            particles: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "hells-gauntlet-settings";

    /// Generator config for the chosen difficulty and layout
    pub fn level_config(&self) -> LevelConfig {
        let mut config = self.difficulty.config(self.layout);
        if let Some(policy) = self.horizontal_contact {
            config.horizontal_contact = policy;
        }
        config
    }

    /// Effective particles (respects reduced_motion)
    pub fn effective_particles(&self) -> bool {
        self.particles && !self.reduced_motion
    }

    /// Volumes clamped to 0.0 - 1.0
    pub fn volumes(&self) -> (f32, f32) {
        (
            self.master_volume.clamp(0.0, 1.0),
            self.sfx_volume.clamp(0.0, 1.0),
        )
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match read_json(store, Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings; failures are logged and dropped
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match write_json(store, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Could not save settings: {}", e),
        }
    }
}
