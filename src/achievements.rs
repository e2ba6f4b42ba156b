//! Cross-session statistics and achievement tags
//!
//! Persisted to the key-value store, independent of the save slot. Every
//! achievement unlocks at most once; unlocking returns the new tags so the
//! caller can play a cue or show a banner.

use serde::{Deserialize, Serialize};

use crate::persistence::{read_json, write_json};
use crate::platform::storage::KeyValueStore;

/// Seconds of play for the play-time milestone
pub const PLAY_TIME_MILESTONE: f32 = 300.0;

/// Unlockable milestones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Achievement {
    Die10Times,
    Die50Times,
    Die100Times,
    Play5Minutes,
    Victory,
}

impl Achievement {
    pub const ALL: [Achievement; 5] = [
        Achievement::Die10Times,
        Achievement::Die50Times,
        Achievement::Die100Times,
        Achievement::Play5Minutes,
        Achievement::Victory,
    ];

    /// Stable tag stored in saves
    pub fn tag(&self) -> &'static str {
        match self {
            Achievement::Die10Times => "die_10_times",
            Achievement::Die50Times => "die_50_times",
            Achievement::Die100Times => "die_100_times",
            Achievement::Play5Minutes => "play_5_minutes",
            Achievement::Victory => "victory",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.tag() == tag)
    }

    /// Banner text
    pub fn title(&self) -> &'static str {
        match self {
            Achievement::Die10Times => "DIED 10 TIMES",
            Achievement::Die50Times => "DIED 50 TIMES",
            Achievement::Die100Times => "DIED 100 TIMES",
            Achievement::Play5Minutes => "PLAYED 5 MINUTES",
            Achievement::Victory => "ESCAPED THE GAUNTLET",
        }
    }

    /// Death milestone for this achievement, if it is one
    fn death_threshold(&self) -> Option<u32> {
        match self {
            Achievement::Die10Times => Some(10),
            Achievement::Die50Times => Some(50),
            Achievement::Die100Times => Some(100),
            _ => None,
        }
    }
}

/// Lifetime statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total_deaths: u32,
    /// Seconds
    pub total_play_time: f32,
    pub levels_completed: u32,
    /// Unlocked tags, in unlock order
    pub achievements: Vec<String>,
}

impl Stats {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "hells-gauntlet-stats";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.achievements.iter().any(|t| t == achievement.tag())
    }

    /// Record an unlock; false if it was already unlocked
    fn unlock(&mut self, achievement: Achievement) -> bool {
        if self.is_unlocked(achievement) {
            return false;
        }
        log::info!("Achievement unlocked: {}", achievement.title());
        self.achievements.push(achievement.tag().to_string());
        true
    }

    /// Check every milestone against the current counters
    fn check(&mut self) -> Vec<Achievement> {
        let mut unlocked = Vec::new();
        for achievement in Achievement::ALL {
            let reached = match achievement.death_threshold() {
                Some(n) => self.total_deaths >= n,
                None => {
                    achievement == Achievement::Play5Minutes
                        && self.total_play_time >= PLAY_TIME_MILESTONE
                }
            };
            if reached && self.unlock(achievement) {
                unlocked.push(achievement);
            }
        }
        unlocked
    }

    pub fn add_death(&mut self) -> Vec<Achievement> {
        self.total_deaths += 1;
        self.check()
    }

    pub fn add_play_time(&mut self, seconds: f32) -> Vec<Achievement> {
        if seconds.is_finite() && seconds > 0.0 {
            self.total_play_time += seconds;
        }
        self.check()
    }

    /// Level completed; unlocks `victory` the first time
    pub fn record_win(&mut self) -> Vec<Achievement> {
        self.levels_completed += 1;
        let mut unlocked = self.check();
        if self.unlock(Achievement::Victory) {
            unlocked.push(Achievement::Victory);
        }
        unlocked
    }

    /// Load stats, starting fresh if none are stored
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match read_json::<Stats>(store, Self::STORAGE_KEY) {
            Some(stats) => {
                log::info!(
                    "Loaded stats ({} deaths, {} achievements)",
                    stats.total_deaths,
                    stats.achievements.len()
                );
                stats
            }
            None => {
                log::info!("No stats found, starting fresh");
                Self::new()
            }
        }
    }

    /// Save stats; failures are logged and dropped
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        if let Err(e) = write_json(store, Self::STORAGE_KEY, self) {
            log::warn!("Could not save stats: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::MemoryStore;

    #[test]
    fn test_tags_roundtrip() {
        for a in Achievement::ALL {
            assert_eq!(Achievement::from_tag(a.tag()), Some(a));
        }
        assert_eq!(Achievement::from_tag("die_1000_times"), None);
    }

    #[test]
    fn test_death_milestones_unlock_once() {
        let mut stats = Stats::new();
        for _ in 0..9 {
            assert!(stats.add_death().is_empty());
        }
        assert_eq!(stats.add_death(), vec![Achievement::Die10Times]);
        assert!(stats.add_death().is_empty());

        for _ in 11..49 {
            stats.add_death();
        }
        assert_eq!(stats.add_death(), vec![Achievement::Die50Times]);
        assert_eq!(stats.total_deaths, 50);
        assert_eq!(stats.achievements, vec!["die_10_times", "die_50_times"]);
    }

    #[test]
    fn test_play_time_milestone() {
        let mut stats = Stats::new();
        assert!(stats.add_play_time(299.0).is_empty());
        assert_eq!(stats.add_play_time(1.0), vec![Achievement::Play5Minutes]);
        assert!(stats.add_play_time(500.0).is_empty());
    }

    #[test]
    fn test_bad_play_time_ignored() {
        let mut stats = Stats::new();
        stats.add_play_time(f32::NAN);
        stats.add_play_time(-5.0);
        assert_eq!(stats.total_play_time, 0.0);
    }

    #[test]
    fn test_victory_first_win_only() {
        let mut stats = Stats::new();
        assert_eq!(stats.record_win(), vec![Achievement::Victory]);
        assert!(stats.record_win().is_empty());
        assert_eq!(stats.levels_completed, 2);
    }

    #[test]
    fn test_load_catches_up_on_stored_counters() {
        let mut store = MemoryStore::new();
        let stats = Stats {
            total_deaths: 99,
            achievements: vec!["die_10_times".into(), "die_50_times".into()],
            ..Default::default()
        };
        stats.save(&mut store);

        let mut loaded = Stats::load(&store);
        assert_eq!(loaded, stats);
        assert_eq!(loaded.add_death(), vec![Achievement::Die100Times]);
    }
}
