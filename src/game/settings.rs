use crate::model::{ComputerDifficulty, Difficulty};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "fun-games-hub";

#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    /// Last Blind Ranking tier picked on the start screen.
    #[serde(default)]
    pub difficulty: Difficulty,

    #[serde(default)]
    pub computer_difficulty: ComputerDifficulty,

    #[serde(default = "default_circle_count")]
    pub circle_count: usize,

    /// How long an unplaceable draw stays on screen before the game ends.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_unplaceable_delay")]
    pub unplaceable_delay: Duration,

    /// How long a non-matching cell stays revealed.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_mismatch_delay")]
    pub mismatch_delay: Duration,

    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_match_delay")]
    pub match_delay: Duration,

    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_computer_think_delay")]
    pub computer_think_delay: Duration,

    /// Overrides the platform data directory for profiles and stats.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

// Helper functions for default values
fn default_version() -> u32 {
    2
}
fn default_circle_count() -> usize {
    25
}
fn default_unplaceable_delay() -> Duration {
    Duration::from_millis(3000)
}
fn default_mismatch_delay() -> Duration {
    Duration::from_millis(2000)
}
fn default_match_delay() -> Duration {
    Duration::from_millis(1500)
}
fn default_computer_think_delay() -> Duration {
    Duration::from_millis(1000)
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: default_version(),
            difficulty: Difficulty::default(),
            computer_difficulty: ComputerDifficulty::default(),
            circle_count: default_circle_count(),
            unplaceable_delay: default_unplaceable_delay(),
            mismatch_delay: default_mismatch_delay(),
            match_delay: default_match_delay(),
            computer_think_delay: default_computer_think_delay(),
            data_dir: None,
        }
    }
}

impl Settings {
    /// Same as `Default`, with every presentation delay set to zero.
    pub fn instant() -> Self {
        Settings {
            unplaceable_delay: Duration::ZERO,
            mismatch_delay: Duration::ZERO,
            match_delay: Duration::ZERO,
            computer_think_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(contents) = fs::read_to_string(path) {
            if let Ok(mut settings) = serde_json::from_str::<Settings>(&contents) {
                settings.migrate();
                return settings;
            }
            log::error!(target: "settings", "Ignoring unparseable settings at {:?}", path);
        }
        let default = Settings::default();
        if let Err(e) = default.save_to(path) {
            log::error!(target: "settings", "Failed to write default settings: {}", e);
        }
        default
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        // Ensure the directory exists
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)
    }

    fn platform_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    fn settings_path() -> PathBuf {
        Self::platform_data_dir().join("settings.json")
    }

    /// Directory holding the profile and stats files.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(Self::platform_data_dir)
    }

    fn migrate(&mut self) {
        match self.version {
            // version 1 had no presentation delays; serde defaults fill them
            0 | 1 => {
                self.version = 2;
            }
            _ => (),
        }
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        std::env::var("SEED").ok().and_then(|v| v.parse::<u64>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_load_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf/settings.json");
        let settings = Settings::load_from(&path);
        assert_eq!(settings, Settings::default());
        assert!(path.exists());
    }

    #[test]
    fn test_partial_file_is_filled_with_defaults_and_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"version": 1, "difficulty": "hard", "mismatch_delay": 500}"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.version, 2);
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.mismatch_delay, Duration::from_millis(500));
        assert_eq!(settings.unplaceable_delay, Duration::from_millis(3000));
        assert_eq!(settings.circle_count, 25);
    }

    #[test]
    fn test_unparseable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_data_dir_override() {
        let settings = Settings {
            data_dir: Some(PathBuf::from("/tmp/hub")),
            ..Default::default()
        };
        assert_eq!(settings.data_dir(), PathBuf::from("/tmp/hub"));
    }

    #[test]
    #[serial]
    fn test_seed_from_env() {
        std::env::set_var("SEED", "42");
        assert_eq!(Settings::seed_from_env(), Some(42));
        std::env::set_var("SEED", "not-a-number");
        assert_eq!(Settings::seed_from_env(), None);
        std::env::remove_var("SEED");
        assert_eq!(Settings::seed_from_env(), None);
    }

    #[test]
    #[serial]
    fn test_debug_mode_from_env() {
        std::env::set_var("DEBUG", "1");
        assert!(Settings::is_debug_mode());
        std::env::remove_var("DEBUG");
        assert!(!Settings::is_debug_mode());
    }
}
