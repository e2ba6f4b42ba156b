//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard and touch merged into one control state)
//! - Storage (LocalStorage on web, in-memory natively)

pub mod input;
pub mod storage;

pub use input::{Control, InputState};
pub use storage::{KeyValueStore, MemoryStore, NullStore, StorageError};
