use super::profile_store::{ProfileStore, StatsRecord};
use crate::model::{Difficulty, DifficultyRecord, HighScores, PlayerStats, PERFECT_SCORE};
use log::{error, info};
use serde_json::Value;

pub const GAME_ID: &str = "blind-ranking";
pub const LEGACY_HIGH_SCORES_KEY: &str = "blindRankingHighScores";
pub const LEGACY_PLAYER_STATS_KEY: &str = "blindRankingPlayerStats";

/// High scores and aggregate stats for the current profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlindRankingRecords {
    pub high_scores: HighScores,
    pub player_stats: PlayerStats,
}

fn as_count(value: Option<&Value>) -> Option<u32> {
    let value = value?;
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
        .map(|v| v.min(u32::MAX as u64) as u32)
}

/// Structured per-difficulty records, filling gaps: a missing high score is
/// 0 and a missing perfect-game count is inferred from the high score.
fn normalize_high_scores(value: &Value) -> HighScores {
    let mut high_scores = HighScores::default();
    for difficulty in Difficulty::all() {
        let entry = value.get(difficulty.key()).filter(|v| v.is_object());
        let record = match entry {
            Some(entry) => {
                let high_score = as_count(entry.get("highScore")).unwrap_or(0);
                let perfect_games = as_count(entry.get("perfectGames"))
                    .unwrap_or(u32::from(high_score == PERFECT_SCORE));
                DifficultyRecord {
                    high_score,
                    perfect_games,
                }
            }
            None => DifficultyRecord::default(),
        };
        *high_scores.get_mut(difficulty) = record;
    }
    high_scores
}

/// Legacy high scores were either flat numbers per difficulty or already
/// structured records.
fn migrate_legacy_high_scores(value: &Value) -> HighScores {
    let flat = Difficulty::all()
        .iter()
        .any(|difficulty| value.get(difficulty.key()).is_some_and(Value::is_number));
    if !flat {
        return normalize_high_scores(value);
    }
    let mut high_scores = HighScores::default();
    for difficulty in Difficulty::all() {
        let score = as_count(value.get(difficulty.key())).unwrap_or(0);
        *high_scores.get_mut(difficulty) = DifficultyRecord {
            high_score: score,
            perfect_games: u32::from(score == PERFECT_SCORE),
        };
    }
    high_scores
}

fn parse_player_stats(value: Value) -> PlayerStats {
    // `scores` that isn't a list is dropped rather than failing the record
    let mut value = value;
    if let Some(record) = value.as_object_mut() {
        if record.get("scores").is_some_and(|s| !s.is_array()) {
            record.remove("scores");
        }
    }
    serde_json::from_value(value).unwrap_or_default()
}

/// Legacy player stats were keyed by player name; the first entry wins. A
/// flat record is accepted as well.
fn migrate_legacy_player_stats(value: Value) -> PlayerStats {
    if value.get("gamesPlayed").is_some_and(Value::is_number) {
        return parse_player_stats(value);
    }
    match value {
        Value::Object(by_name) => match by_name.into_iter().next() {
            Some((_, entry)) if entry.is_object() => parse_player_stats(entry),
            _ => PlayerStats::default(),
        },
        _ => PlayerStats::default(),
    }
}

fn read_legacy(store: &ProfileStore, key: &str) -> Option<Result<Value, serde_json::Error>> {
    store.read_raw(key).map(|raw| serde_json::from_str::<Value>(&raw))
}

impl BlindRankingRecords {
    /// Loads the current profile's records, creating a profile if needed and
    /// migrating the pre-profile storage keys on first use.
    pub fn load(store: &ProfileStore) -> Self {
        let profile_id = store.ensure_current_profile();
        let data = store.get_stats_for_game(&profile_id, GAME_ID);

        let high_scores = match data.as_ref().and_then(|d| d.get("highScores")) {
            Some(value) => normalize_high_scores(value),
            None => match read_legacy(store, LEGACY_HIGH_SCORES_KEY) {
                Some(Ok(legacy)) => {
                    let migrated = migrate_legacy_high_scores(&legacy);
                    info!(target: "blind_ranking", "Migrated legacy high scores: {:?}", migrated);
                    store.set_stats_for_game(
                        &profile_id,
                        GAME_ID,
                        Self::record_with("highScores", &migrated),
                    );
                    migrated
                }
                Some(Err(e)) => {
                    error!(target: "blind_ranking", "Ignoring unparseable legacy high scores: {}", e);
                    HighScores::default()
                }
                None => HighScores::default(),
            },
        };

        let player_stats = match data.and_then(|mut d| d.remove("playerStats")) {
            Some(value) => parse_player_stats(value),
            None => match read_legacy(store, LEGACY_PLAYER_STATS_KEY) {
                Some(Ok(legacy)) => {
                    let migrated = migrate_legacy_player_stats(legacy);
                    store.set_stats_for_game(
                        &profile_id,
                        GAME_ID,
                        Self::record_with("playerStats", &migrated),
                    );
                    migrated
                }
                Some(Err(e)) => {
                    error!(target: "blind_ranking", "Ignoring unparseable legacy player stats: {}", e);
                    PlayerStats::default()
                }
                None => PlayerStats::default(),
            },
        };

        Self {
            high_scores,
            player_stats,
        }
    }

    fn record_with<T: serde::Serialize>(key: &str, value: &T) -> StatsRecord {
        let mut record = StatsRecord::new();
        match serde_json::to_value(value) {
            Ok(value) => {
                record.insert(key.to_string(), value);
            }
            Err(e) => error!(target: "blind_ranking", "Failed to serialize {}: {}", key, e),
        }
        record
    }

    pub fn record_game(&mut self, difficulty: Difficulty, score: u32) {
        self.high_scores.get_mut(difficulty).record(score);
        self.player_stats.record(score);
    }

    /// Writes both records for the current profile; without a current
    /// profile nothing is saved.
    pub fn save(&self, store: &ProfileStore) {
        let Some(profile_id) = store.get_current_profile_id() else {
            return;
        };
        let mut record = Self::record_with("highScores", &self.high_scores);
        record.extend(Self::record_with("playerStats", &self.player_stats));
        store.set_stats_for_game(&profile_id, GAME_ID, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fresh_profile_has_defaults() {
        let store = ProfileStore::in_memory();
        let records = BlindRankingRecords::load(&store);
        assert_eq!(records, BlindRankingRecords::default());
        assert!(store.get_current_profile_id().is_some());
    }

    #[test]
    fn test_record_and_reload() {
        let store = ProfileStore::in_memory();
        let mut records = BlindRankingRecords::load(&store);
        records.record_game(Difficulty::Medium, 10);
        records.record_game(Difficulty::Medium, 6);
        records.save(&store);

        let reloaded = BlindRankingRecords::load(&store);
        assert_eq!(
            *reloaded.high_scores.get(Difficulty::Medium),
            DifficultyRecord {
                high_score: 10,
                perfect_games: 1
            }
        );
        assert_eq!(reloaded.player_stats.games_played, 2);
        assert_eq!(reloaded.player_stats.scores, vec![10, 6]);
    }

    #[test]
    fn test_save_keeps_other_fields() {
        let store = ProfileStore::in_memory();
        let id = store.ensure_current_profile();
        let mut extra = StatsRecord::new();
        extra.insert("lastPlayed".to_string(), json!("yesterday"));
        store.set_stats_for_game(&id, GAME_ID, extra);

        BlindRankingRecords::default().save(&store);
        let data = store.get_stats_for_game(&id, GAME_ID).unwrap();
        assert_eq!(data["lastPlayed"], json!("yesterday"));
        assert!(data.contains_key("highScores"));
    }

    #[test]
    fn test_migrates_flat_legacy_high_scores_once() {
        let store = ProfileStore::in_memory();
        store.write_raw(LEGACY_HIGH_SCORES_KEY, r#"{"easy": 10, "medium": 7}"#);

        let records = BlindRankingRecords::load(&store);
        assert_eq!(
            records.high_scores,
            HighScores {
                easy: DifficultyRecord {
                    high_score: 10,
                    perfect_games: 1
                },
                medium: DifficultyRecord {
                    high_score: 7,
                    perfect_games: 0
                },
                hard: DifficultyRecord::default(),
            }
        );

        // the profile record now carries the migrated data
        store.write_raw(LEGACY_HIGH_SCORES_KEY, r#"{"easy": 1}"#);
        let again = BlindRankingRecords::load(&store);
        assert_eq!(again.high_scores.easy.high_score, 10);
    }

    #[test]
    fn test_normalizes_structured_records() {
        let store = ProfileStore::in_memory();
        let id = store.ensure_current_profile();
        let mut data = StatsRecord::new();
        data.insert(
            "highScores".to_string(),
            json!({"easy": {"highScore": 10}, "hard": 3, "medium": {"perfectGames": 2}}),
        );
        store.set_stats_for_game(&id, GAME_ID, data);

        let records = BlindRankingRecords::load(&store);
        assert_eq!(records.high_scores.easy.perfect_games, 1);
        assert_eq!(records.high_scores.hard, DifficultyRecord::default());
        assert_eq!(
            records.high_scores.medium,
            DifficultyRecord {
                high_score: 0,
                perfect_games: 2
            }
        );
    }

    #[test]
    fn test_unparseable_legacy_keys_give_defaults() {
        let store = ProfileStore::in_memory();
        store.write_raw(LEGACY_HIGH_SCORES_KEY, "{oops");
        store.write_raw(LEGACY_PLAYER_STATS_KEY, "[1,");
        assert_eq!(BlindRankingRecords::load(&store), BlindRankingRecords::default());
    }

    #[test]
    fn test_migrates_legacy_player_stats_by_name() {
        let store = ProfileStore::in_memory();
        store.write_raw(
            LEGACY_PLAYER_STATS_KEY,
            r#"{"Ana": {"gamesPlayed": 3, "totalScore": 12, "highScore": 6, "scores": "bad"}}"#,
        );
        let records = BlindRankingRecords::load(&store);
        assert_eq!(
            records.player_stats,
            PlayerStats {
                games_played: 3,
                total_score: 12,
                high_score: 6,
                scores: vec![],
            }
        );
    }

    #[test]
    fn test_migrates_flat_legacy_player_stats() {
        let store = ProfileStore::in_memory();
        store.write_raw(
            LEGACY_PLAYER_STATS_KEY,
            r#"{"gamesPlayed": 1, "totalScore": 4, "highScore": 4, "scores": [4]}"#,
        );
        let records = BlindRankingRecords::load(&store);
        assert_eq!(records.player_stats.scores, vec![4]);
    }
}
