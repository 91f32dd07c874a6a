//! JSON loading for behavior tuning files.
//!
//! Both `PlayerConfig` and `EnemyPolicy` are plain serde types; this module
//! holds the shared file-loading path and its error type. Config loading is
//! the only fallible surface in the crate; everything at simulation time is
//! guards and no-ops, not errors.

use serde::de::DeserializeOwned;
use std::fmt;
use std::fs;
use std::path::Path;

/// Errors that can occur while loading a tuning file
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read
    Io(std::io::Error),

    /// The file contents were not valid JSON for the expected type
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Io(error) => {
                write!(f, "Failed to read config file: {}", error)
            }
            ConfigError::Parse(error) => {
                write!(f, "Failed to parse config file: {}", error)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(error) => Some(error),
            ConfigError::Parse(error) => Some(error),
        }
    }
}

impl From<ConfigError> for String {
    fn from(error: ConfigError) -> Self {
        error.to_string()
    }
}

/// Loads any serde-deserializable tuning type from a JSON file.
pub fn load_from_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    serde_json::from_str(&content).map_err(ConfigError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::EnemyPolicy;
    use crate::player::PlayerConfig;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = fs::File::create(&path).expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write temp config");
        path
    }

    #[test]
    fn test_partial_policy_fills_defaults() {
        let path = write_temp(
            "enemy_policy_partial.json",
            r#"{ "walk_duration": 3.0, "has_sight_perception": true }"#,
        );

        let policy = EnemyPolicy::load_from_file(&path).expect("load policy");
        assert_eq!(policy.walk_duration, 3.0);
        assert!(policy.has_sight_perception);
        // Untouched fields come from the defaults
        assert_eq!(policy.patrols_before_idle, 2);
        assert_eq!(policy.max_health, 300);
    }

    #[test]
    fn test_player_config_from_file() {
        let path = write_temp(
            "player_config.json",
            r#"{ "melee_damage": 500, "max_health": 2000 }"#,
        );

        let config = PlayerConfig::load_from_file(&path).expect("load config");
        assert_eq!(config.melee_damage, 500);
        assert_eq!(config.max_health, 2000);
        assert_eq!(config.swing_duration, 0.6);
    }

    #[test]
    fn test_invalid_json_reports_parse_error() {
        let path = write_temp("enemy_policy_broken.json", "{ not json");

        let result = EnemyPolicy::load_from_file(&path);
        match result {
            Err(ConfigError::Parse(_)) => {}
            other => panic!("expected parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_file_reports_io_error() {
        let result = EnemyPolicy::load_from_file("/definitely/not/a/real/path.json");
        match result {
            Err(ConfigError::Io(_)) => {}
            other => panic!("expected io error, got {:?}", other.map(|_| ())),
        }
    }
}
