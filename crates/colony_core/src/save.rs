//! Save and settings persistence.
//!
//! The core serializes to JSON blobs under well-known keys and leaves the
//! actual storage to a [`SaveStore`] implementation (browser local storage,
//! a file, an in-memory map for tests). Loading is forgiving: a missing or
//! corrupt blob logs a warning and falls back to a fresh state rather than
//! failing the session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::buildings::Building;
use crate::error::{GameError, Result};
use crate::goals::Goal;
use crate::resources::Resource;
use crate::vehicles::VehicleFleet;

/// Storage key for the save blob.
pub const SAVE_KEY: &str = "steelColonySave";

/// Storage key for the settings blob.
pub const SETTINGS_KEY: &str = "steelColonySettings";

/// Key-value blob storage backing saves and settings.
pub trait SaveStore {
    /// Fetch the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    fn put(&mut self, key: &str, value: String) -> Result<()>;
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}

/// The persisted game state.
///
/// Unlock, tech and node-field state is deliberately absent: it is
/// re-derived from the restored ledger and buildings on load, so a save
/// taken mid-research forgets the research.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    /// Resource quantities.
    pub resources: BTreeMap<Resource, u32>,
    /// Constructed buildings.
    pub buildings: Vec<Building>,
    /// The campaign goal list. Written for the contract only: loading
    /// restores progress through `current_goal_index` against the built-in
    /// campaign and ignores this field.
    pub game_goals: Vec<Goal>,
    /// Index of the active goal.
    pub current_goal_index: usize,
    /// Wall-clock stamp of when the run started, in ms.
    pub game_started_time: u64,
    /// The transport fleet.
    pub transportation: VehicleFleet,
}

/// Graphics quality presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphicsQuality {
    /// Lowest fidelity.
    Low,
    /// Default fidelity.
    Medium,
    /// Highest fidelity.
    High,
}

/// Player-facing settings, persisted separately from the save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Sound effect volume, 0-100.
    pub sound: u32,
    /// Music volume, 0-100.
    pub music: u32,
    /// Graphics quality preset.
    pub graphics: GraphicsQuality,
    /// Whether shadows are rendered.
    pub shadows: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound: 70,
            music: 50,
            graphics: GraphicsQuality::Medium,
            shadows: true,
        }
    }
}

/// Serialize and store a save blob.
pub fn save_game<S: SaveStore>(store: &mut S, data: &SaveData) -> Result<()> {
    let blob = serde_json::to_string(data).map_err(|e| GameError::Save(e.to_string()))?;
    store.put(SAVE_KEY, blob)
}

/// Load the save blob, if a valid one exists.
///
/// A corrupt blob is logged and treated as no save.
#[must_use]
pub fn load_game<S: SaveStore>(store: &S) -> Option<SaveData> {
    let blob = store.get(SAVE_KEY)?;
    match serde_json::from_str(&blob) {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable save blob");
            None
        }
    }
}

/// Serialize and store the settings blob.
pub fn save_settings<S: SaveStore>(store: &mut S, settings: &Settings) -> Result<()> {
    let blob =
        serde_json::to_string(settings).map_err(|e| GameError::Save(e.to_string()))?;
    store.put(SETTINGS_KEY, blob)
}

/// Load settings, falling back to defaults for missing or corrupt blobs.
#[must_use]
pub fn load_settings<S: SaveStore>(store: &S) -> Settings {
    let Some(blob) = store.get(SETTINGS_KEY) else {
        return Settings::default();
    };
    match serde_json::from_str(&blob) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable settings blob");
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::ProgressionTracker;

    fn sample_save() -> SaveData {
        let mut resources = BTreeMap::new();
        resources.insert(Resource::Wood, 42);
        resources.insert(Resource::Steel, 7);
        SaveData {
            resources,
            buildings: Vec::new(),
            game_goals: ProgressionTracker::campaign().goals().to_vec(),
            current_goal_index: 2,
            game_started_time: 1_000,
            transportation: VehicleFleet::new(),
        }
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let mut store = MemoryStore::new();
        let data = sample_save();
        save_game(&mut store, &data).unwrap();
        assert_eq!(load_game(&store), Some(data));
    }

    #[test]
    fn test_missing_save_loads_none() {
        let store = MemoryStore::new();
        assert_eq!(load_game(&store), None);
    }

    #[test]
    fn test_corrupt_save_degrades_to_none() {
        let mut store = MemoryStore::new();
        store.put(SAVE_KEY, "{not json".to_owned()).unwrap();
        assert_eq!(load_game(&store), None);
    }

    #[test]
    fn test_settings_default_and_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(load_settings(&store), Settings::default());

        let custom = Settings {
            sound: 0,
            music: 100,
            graphics: GraphicsQuality::High,
            shadows: false,
        };
        save_settings(&mut store, &custom).unwrap();
        assert_eq!(load_settings(&store), custom);
    }

    #[test]
    fn test_corrupt_settings_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.put(SETTINGS_KEY, "[]".to_owned()).unwrap();
        assert_eq!(load_settings(&store), Settings::default());
    }

    #[test]
    fn test_save_blob_uses_contract_field_names() {
        let blob = serde_json::to_string(&sample_save()).unwrap();
        assert!(blob.contains("\"currentGoalIndex\":2"));
        assert!(blob.contains("\"gameStartedTime\":1000"));
        assert!(blob.contains("\"transportation\""));
        assert!(blob.contains("\"wood\":42"));
    }
}
