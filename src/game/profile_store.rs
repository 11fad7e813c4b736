use crate::model::Profile;
use crate::store::{KeyValueStore, MemoryStore};
use log::{error, trace};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::rc::Rc;

pub const PROFILES_KEY: &str = "funGamesHub_profiles";
pub const CURRENT_PROFILE_KEY: &str = "funGamesHub_currentProfileId";
pub const STATS_KEY: &str = "funGamesHub_stats";

/// Free-form named counters for one game under one profile.
pub type StatsRecord = Map<String, Value>;

/// Profiles and per-profile, per-game stats on top of a raw key-value store.
///
/// Read failures (missing keys, unparseable JSON) degrade to empty values and
/// write failures are logged; callers never see an error.
#[derive(Clone)]
pub struct ProfileStore {
    backend: Rc<dyn KeyValueStore>,
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStore").finish_non_exhaustive()
    }
}

impl ProfileStore {
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryStore::new()))
    }

    /// Raw value under `key`, for keys outside the profile layout.
    pub fn read_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                error!(target: "store", "Failed to read {}: {}", key, e);
                None
            }
        }
    }

    pub fn write_raw(&self, key: &str, value: &str) {
        if let Err(e) = self.backend.set(key, value) {
            error!(target: "store", "Failed to write {}: {}", key, e);
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(target: "store", "Discarding unparseable {}: {}", key, e);
                None
            }
        }
    }

    fn write_json<T: serde::Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(contents) => self.write_raw(key, &contents),
            Err(e) => error!(target: "store", "Failed to serialize {}: {}", key, e),
        }
    }

    /// Stored profiles; entries that do not parse are skipped one by one so
    /// a single bad record cannot hide the rest.
    pub fn get_profiles(&self) -> Vec<Profile> {
        let entries: Vec<Value> = self.read_json(PROFILES_KEY).unwrap_or_default();
        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    error!(target: "store", "Skipping unparseable profile: {}", e);
                    None
                }
            })
            .collect()
    }

    fn save_profiles(&self, profiles: &[Profile]) {
        self.write_json(PROFILES_KEY, &profiles);
    }

    pub fn get_current_profile_id(&self) -> Option<String> {
        self.read_raw(CURRENT_PROFILE_KEY)
            .filter(|id| !id.is_empty())
    }

    pub fn set_current_profile_id(&self, profile_id: Option<&str>) {
        let result = match profile_id {
            Some(id) => self.backend.set(CURRENT_PROFILE_KEY, id),
            None => self.backend.remove(CURRENT_PROFILE_KEY),
        };
        if let Err(e) = result {
            error!(target: "store", "Failed to update current profile: {}", e);
        }
    }

    /// Creates a profile and makes it current.
    pub fn create_profile(&self, name: &str) -> Profile {
        let mut profiles = self.get_profiles();
        let profile = Profile::new(name);
        profiles.push(profile.clone());
        self.save_profiles(&profiles);
        self.set_current_profile_id(Some(&profile.id));
        trace!(target: "store", "Created profile {:?}", profile);
        profile
    }

    pub fn get_current_profile(&self) -> Option<Profile> {
        let id = self.get_current_profile_id()?;
        self.get_profiles().into_iter().find(|p| p.id == id)
    }

    /// Current profile id, creating a default profile when there is none or
    /// the stored id no longer names a profile.
    pub fn ensure_current_profile(&self) -> String {
        if let Some(id) = self.get_current_profile_id() {
            if self.get_profiles().iter().any(|p| p.id == id) {
                return id;
            }
        }
        self.create_profile(crate::model::DEFAULT_PROFILE_NAME).id
    }

    fn all_stats(&self) -> Map<String, Value> {
        self.read_json(STATS_KEY).unwrap_or_default()
    }

    /// Every game's record for `profile_id`, keyed by game id.
    pub fn get_stats(&self, profile_id: &str) -> StatsRecord {
        match self.all_stats().remove(profile_id) {
            Some(Value::Object(stats)) => stats,
            _ => Map::new(),
        }
    }

    pub fn get_stats_for_game(&self, profile_id: &str, game_id: &str) -> Option<StatsRecord> {
        match self.get_stats(profile_id).remove(game_id) {
            Some(Value::Object(record)) => Some(record),
            _ => None,
        }
    }

    /// Typed view of a game record; missing or malformed records give the
    /// default.
    pub fn get_typed_stats<T: DeserializeOwned + Default>(
        &self,
        profile_id: &str,
        game_id: &str,
    ) -> T {
        self.get_stats_for_game(profile_id, game_id)
            .and_then(|record| serde_json::from_value(Value::Object(record)).ok())
            .unwrap_or_default()
    }

    /// Shallow-merges `partial` into the stored record and persists at once.
    pub fn set_stats_for_game(&self, profile_id: &str, game_id: &str, partial: StatsRecord) {
        let mut all = self.all_stats();
        let profile_stats = all
            .entry(profile_id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !profile_stats.is_object() {
            *profile_stats = Value::Object(Map::new());
        }
        if let Value::Object(games) = profile_stats {
            let record = games
                .entry(game_id.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !record.is_object() {
                *record = Value::Object(Map::new());
            }
            if let Value::Object(record) = record {
                record.extend(partial);
            }
        }
        self.write_json(STATS_KEY, &all);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> StatsRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_ensure_current_profile_creates_default() {
        let store = ProfileStore::in_memory();
        assert_eq!(store.get_current_profile_id(), None);

        let id = store.ensure_current_profile();
        assert_eq!(store.get_current_profile_id(), Some(id.clone()));
        assert_eq!(store.ensure_current_profile(), id);
        assert_eq!(store.get_profiles().len(), 1);
        assert_eq!(store.get_current_profile().unwrap().name, "Player");
    }

    #[test]
    fn test_dangling_current_id_is_replaced() {
        let store = ProfileStore::in_memory();
        store.set_current_profile_id(Some("p_gone"));
        let id = store.ensure_current_profile();
        assert_ne!(id, "p_gone");
        assert!(store.get_current_profile().is_some());
    }

    #[test]
    fn test_set_stats_shallow_merges() {
        let store = ProfileStore::in_memory();
        let id = store.create_profile("Ana").id;
        assert_eq!(store.get_stats_for_game(&id, "mimi-memory-chess"), None);

        store.set_stats_for_game(&id, "mimi-memory-chess", record(json!({"gamesPlayed": 1, "wins": 1})));
        store.set_stats_for_game(&id, "mimi-memory-chess", record(json!({"gamesPlayed": 2})));

        let stored = store.get_stats_for_game(&id, "mimi-memory-chess").unwrap();
        assert_eq!(Value::Object(stored), json!({"gamesPlayed": 2, "wins": 1}));
    }

    #[test]
    fn test_repeated_identical_writes_are_idempotent() {
        let store = ProfileStore::in_memory();
        let id = store.ensure_current_profile();
        let partial = record(json!({"highScores": {"easy": {"highScore": 4, "perfectGames": 0}}}));

        store.set_stats_for_game(&id, "blind-ranking", partial.clone());
        let once = store.get_stats_for_game(&id, "blind-ranking");
        store.set_stats_for_game(&id, "blind-ranking", partial);
        assert_eq!(store.get_stats_for_game(&id, "blind-ranking"), once);
    }

    #[test]
    fn test_stats_are_namespaced_by_profile_and_game() {
        let store = ProfileStore::in_memory();
        let a = store.create_profile("A").id;
        let b = store.create_profile("B").id;
        store.set_stats_for_game(&a, "blind-ranking", record(json!({"x": 1})));
        store.set_stats_for_game(&a, "mimi-memory-chess", record(json!({"y": 2})));

        assert_eq!(store.get_stats(&a).len(), 2);
        assert!(store.get_stats(&b).is_empty());
        assert_eq!(store.get_current_profile_id(), Some(b));
    }

    #[test]
    fn test_corrupt_stats_reset_to_empty() {
        let store = ProfileStore::in_memory();
        let id = store.ensure_current_profile();
        store.write_raw(STATS_KEY, "{not json");
        assert!(store.get_stats(&id).is_empty());

        store.set_stats_for_game(&id, "blind-ranking", record(json!({"x": 1})));
        assert_eq!(
            store.get_stats_for_game(&id, "blind-ranking").map(Value::Object),
            Some(json!({"x": 1}))
        );
    }

    #[test]
    fn test_unparseable_profiles_read_as_empty() {
        let store = ProfileStore::in_memory();
        store.write_raw(PROFILES_KEY, "[{\"id\": 3");
        assert!(store.get_profiles().is_empty());
    }

    #[test]
    fn test_bad_profile_entry_keeps_the_others() {
        let store = ProfileStore::in_memory();
        let ana = store.create_profile("Ana");
        let mut raw: Vec<Value> = serde_json::from_str(&store.read_raw(PROFILES_KEY).unwrap()).unwrap();
        raw.insert(0, json!({"id": 3}));
        store.write_raw(PROFILES_KEY, &Value::Array(raw).to_string());

        assert_eq!(store.get_profiles(), vec![ana.clone()]);
        let bo = store.create_profile("Bo");
        let names: Vec<String> = store.get_profiles().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Ana".to_string(), "Bo".to_string()]);
        assert_eq!(store.get_current_profile(), Some(bo));
    }

    #[test]
    fn test_clear_current_profile() {
        let store = ProfileStore::in_memory();
        store.create_profile("A");
        store.set_current_profile_id(None);
        assert_eq!(store.get_current_profile(), None);
    }
}
