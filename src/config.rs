// Tue Jan 13 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const APP_DIR: &str = "pdx-patcher";
pub const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: String,
    pub version: Option<String>,
    pub patterns_url: Option<String>,
    pub patterns_cache: PathBuf,
    pub achievements_url: Option<String>,
    pub achievements_cache: PathBuf,
    pub feed_timeout_secs: u64,
    pub feed_cooldown_secs: u64,
    pub local_only: bool,
    pub save_backup_dir: PathBuf,
    pub settings_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data = data_dir();
        Self {
            game: "stellaris".to_string(),
            version: None,
            patterns_url: None,
            patterns_cache: data.join("patterns.json"),
            achievements_url: None,
            achievements_cache: data.join("achievements.txt"),
            feed_timeout_secs: 10,
            feed_cooldown_secs: 3600,
            local_only: false,
            save_backup_dir: data.join("saves backup"),
            settings_path: Some(data.join("settings.json")),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_game(mut self, game: &str) -> Self {
        self.game = game.to_lowercase();
        self
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn with_local_only(mut self, local_only: bool) -> Self {
        self.local_only = local_only;
        self
    }

    pub fn with_patterns_cache(mut self, path: PathBuf) -> Self {
        self.patterns_cache = path;
        self
    }

    pub fn with_achievements_cache(mut self, path: PathBuf) -> Self {
        self.achievements_cache = path;
        self
    }

    pub fn with_save_backup_dir(mut self, path: PathBuf) -> Self {
        self.save_backup_dir = path;
        self
    }

    pub fn with_settings_path(mut self, path: Option<PathBuf>) -> Self {
        self.settings_path = path;
        self
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    pub fn feed_cooldown(&self) -> Duration {
        Duration::from_secs(self.feed_cooldown_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.trim().is_empty() {
            return Err(ConfigError::Invalid("game must not be empty".to_string()));
        }
        if self.feed_timeout_secs == 0 {
            return Err(ConfigError::Invalid("feed_timeout_secs must be greater than 0".to_string()));
        }
        for (key, url) in [("patterns_url", &self.patterns_url), ("achievements_url", &self.achievements_url)] {
            if let Some(url) = url {
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(ConfigError::Invalid(format!("{} must be an http(s) URL", key)));
                }
            }
        }
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Missing file means defaults; a broken one is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            log::debug!("No config at {}, using defaults", path.as_ref().display());
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = AppConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.feed_timeout(), Duration::from_secs(10));
        assert!(config.patterns_cache.ends_with("pdx-patcher/patterns.json"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"game": "eu4", "local_only": true}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.game, "eu4");
        assert!(config.local_only);
        assert_eq!(config.feed_cooldown_secs, 3600);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig::new().with_game("HOI4").with_version(Some("1.14".into()));

        config.save(&path).unwrap();
        let loaded = AppConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.game, "hoi4");
    }

    #[test]
    fn test_invalid_values() {
        let mut config = AppConfig::new();
        config.feed_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::new();
        config.patterns_url = Some("ftp://example".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
