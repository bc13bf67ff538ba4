use std::{fs, path::Path, path::PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::paths::ProjectPaths;

/// Application name used for config and data directories
pub const APP_NAME: &str = "dunk-course";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("Could not determine the config directory")]
    NoConfigDir,
    #[error("IO error on config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// The decoy opponent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Hits the enemy takes before dying
    pub health: i64,
    /// Time between the death cue and the end of the session
    pub death_delay_ms: u64,
    pub position: Vec3,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            health: 10,
            death_delay_ms: 4000,
            position: Vec3::new(0.0, 0.0, 800.0),
        }
    }
}

/// Onboarding shown shortly after the level starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorialConfig {
    pub delay_ms: u64,
    pub text: String,
}

impl Default for TutorialConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            text: "Welcome to the basketball course where you dunk with a metal chest! \
                   Defeat the enemy by scoring points, 10 dunks should kill it!"
                .to_string(),
        }
    }
}

/// Placement of the course geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Translation applied to every mesh when the map is finalized
    pub map_offset: Vec3,
    pub hoop_position: Vec3,
    pub floor_size: Vec3,
    pub chest_position: Vec3,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            map_offset: Vec3::new(6000.0, 0.0, 6000.0),
            hoop_position: Vec3::new(0.0, -200.0, 500.0),
            floor_size: Vec3::new(700.0, 50.0, 1200.0),
            chest_position: Vec3::new(15.0, -20.0, 300.0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write logs to a file in the data directory
    pub file: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseConfig {
    #[serde(default)]
    pub enemy: EnemyConfig,
    #[serde(default)]
    pub tutorial: TutorialConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CourseConfig {
    /// Default location of the config file
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let proj_paths = ProjectPaths::new(APP_NAME).ok_or(ConfigError::NoConfigDir)?;
        Ok(proj_paths.config_dir().join("config.toml"))
    }

    /// Load from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        info!(target: "config", "Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, else from the default location, falling
    /// back to defaults when no file exists
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let result = match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        };

        match result {
            Err(ConfigError::NotFound(path)) => {
                info!(target: "config", "No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(ConfigError::NoConfigDir) => Ok(Self::default()),
            other => other,
        }
    }

    /// Reject values the course cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enemy.health < 1 {
            return Err(ConfigError::Invalid(format!(
                "enemy.health must be at least 1, got {}",
                self.enemy.health
            )));
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&self)?;
        fs::write(path, content)?;
        info!(target: "config", "Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_course() {
        let config = CourseConfig::default();
        assert_eq!(config.enemy.health, 10);
        assert_eq!(config.enemy.death_delay_ms, 4000);
        assert_eq!(config.tutorial.delay_ms, 1000);
        assert_eq!(config.layout.hoop_position, Vec3::new(0.0, -200.0, 500.0));
        assert!(!config.logging.file);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: CourseConfig = toml::from_str(
            r#"
[enemy]
health = 3
"#,
        )
        .unwrap();

        assert_eq!(config.enemy.health, 3);
        assert_eq!(config.enemy.death_delay_ms, 4000);
        assert_eq!(config.tutorial, TutorialConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CourseConfig::default();
        config.layout.hoop_position = Vec3::new(10.0, -250.0, 400.0);
        config.save_to(&path).unwrap();

        assert_eq!(CourseConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(
            CourseConfig::load_from(&path),
            Err(ConfigError::NotFound(_))
        ));
        assert_eq!(
            CourseConfig::load_or_default(Some(&path)).unwrap(),
            CourseConfig::default()
        );
    }

    #[test]
    fn test_non_positive_health_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        for health in ["0", "-3", "-9223372036854775808"] {
            fs::write(&path, format!("[enemy]\nhealth = {health}\n")).unwrap();
            assert!(matches!(
                CourseConfig::load_from(&path),
                Err(ConfigError::Invalid(_))
            ));
        }

        fs::write(&path, "[enemy]\nhealth = 1\n").unwrap();
        assert_eq!(CourseConfig::load_from(&path).unwrap().enemy.health, 1);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[enemy]\nhealth = \"lots\"\n").unwrap();

        assert!(matches!(
            CourseConfig::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
