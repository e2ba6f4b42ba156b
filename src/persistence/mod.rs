//! Save/load persistence
//!
//! Features:
//! - Versioned JSON envelope around every stored value
//! - Separate slots for the save snapshot and the last checkpoint
//! - Best-effort field presence: missing fields fall back to defaults
//!
//! Nothing here may stop the game. Callers log failures and move on.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::storage::{KeyValueStore, StorageError};

/// Envelope format version
pub const SAVE_VERSION: u32 = 1;

/// Storage keys
pub const SAVE_KEY: &str = "hells-gauntlet-save";
pub const CHECKPOINT_KEY: &str = "hells-gauntlet-checkpoint";

/// Persistence failures
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("could not encode save data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What a save slot remembers about a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub player_x: f32,
    pub player_y: f32,
    pub death_count: u32,
    /// Seconds
    pub elapsed_time: f32,
    pub achievements: Vec<String>,
}

/// Last safe respawn position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    version: u32,
    /// Unix timestamp (ms) of the write
    #[serde(default)]
    saved_at: f64,
    data: T,
}

/// Current time in milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Current time in milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Write `value` under `key` inside a versioned envelope
pub fn write_json<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistError> {
    let envelope = Envelope {
        version: SAVE_VERSION,
        saved_at: now_ms(),
        data: value,
    };
    let json = serde_json::to_string(&envelope)?;
    store.set(key, &json)?;
    Ok(())
}

/// Read the value under `key`; absent, unreadable or malformed data is `None`
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let json = match store.get(key) {
        Ok(Some(json)) => json,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Could not read {}: {}", key, e);
            return None;
        }
    };
    match serde_json::from_str::<Envelope<T>>(&json) {
        Ok(envelope) => {
            if envelope.version > SAVE_VERSION {
                log::warn!(
                    "{} was written by a newer version ({}), reading anyway",
                    key,
                    envelope.version
                );
            }
            Some(envelope.data)
        }
        Err(e) => {
            log::warn!("Discarding malformed {}: {}", key, e);
            None
        }
    }
}

/// Save slot and checkpoint on top of a key-value store
pub struct SaveSystem {
    store: Box<dyn KeyValueStore>,
}

impl SaveSystem {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn KeyValueStore {
        self.store.as_mut()
    }

    pub fn save(&mut self, snapshot: &Snapshot) -> Result<(), PersistError> {
        write_json(self.store.as_mut(), SAVE_KEY, snapshot)?;
        log::info!(
            "Game saved ({} deaths, {:.0}s)",
            snapshot.death_count,
            snapshot.elapsed_time
        );
        Ok(())
    }

    pub fn load(&self) -> Option<Snapshot> {
        read_json(self.store.as_ref(), SAVE_KEY)
    }

    pub fn set_checkpoint(&mut self, x: f32, y: f32) -> Result<(), PersistError> {
        write_json(self.store.as_mut(), CHECKPOINT_KEY, &Checkpoint { x, y })
    }

    pub fn checkpoint(&self) -> Option<Checkpoint> {
        read_json(self.store.as_ref(), CHECKPOINT_KEY)
    }

    /// Forget the save slot and the checkpoint
    pub fn clear(&mut self) -> Result<(), PersistError> {
        self.store.remove(SAVE_KEY)?;
        self.store.remove(CHECKPOINT_KEY)?;
        log::info!("Saved game cleared");
        Ok(())
    }
}
