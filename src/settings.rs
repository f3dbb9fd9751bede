// Wed Jan 15 2026 - Alex

use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Per-game values the engines read and write. Persistence format is up to
/// the implementation.
pub trait SettingsStore {
    fn installed_path(&self, game: &str) -> Option<PathBuf>;
    fn set_installed_path(&mut self, game: &str, path: &Path);

    fn patched_hash(&self, game: &str) -> Option<String>;
    fn set_patched_hash(&mut self, game: &str, hash: &str);

    fn patched_pattern(&self, game: &str) -> Option<String>;
    fn set_patched_pattern(&mut self, game: &str, pattern: &str);

    fn applied_patches(&self, game: &str) -> Vec<String>;
    fn set_applied_patches(&mut self, game: &str, patches: &[String]);

    fn last_platform(&self, game: &str) -> Option<Platform>;
    fn set_last_platform(&mut self, game: &str, platform: Platform);

    fn patch_configuration(&self, game: &str) -> Option<PatchConfiguration>;
    fn set_patch_configuration(&mut self, configuration: &PatchConfiguration);
}

/// The user's choice for one game, kept between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchConfiguration {
    pub game: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub is_proton: bool,
    #[serde(default)]
    pub selected_patches: Vec<String>,
}

impl PatchConfiguration {
    pub fn new(game: &str) -> Self {
        Self {
            game: game.to_string(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn with_proton(mut self, is_proton: bool) -> Self {
        self.is_proton = is_proton;
        self
    }

    pub fn with_selected_patches(mut self, patches: Vec<String>) -> Self {
        self.selected_patches = patches;
        self
    }

    /// Takes the version and patch selection from `stored` where this run
    /// left them empty.
    pub fn merged_with(mut self, stored: Option<&PatchConfiguration>) -> Self {
        if let Some(stored) = stored.filter(|s| s.game == self.game) {
            if self.version.is_none() {
                self.version = stored.version.clone();
            }
            if self.selected_patches.is_empty() {
                self.selected_patches = stored.selected_patches.clone();
            }
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patched_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patched_pattern: Option<String>,
    #[serde(default)]
    pub applied_patches: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<PatchConfiguration>,
}

/// JSON-backed settings. Without a path it only lives in memory.
///
/// Every setter writes the file through; a failed write is logged and the
/// in-memory value kept.
#[derive(Debug, Default)]
pub struct SettingsFile {
    path: Option<PathBuf>,
    games: HashMap<String, GameSettings>,
}

impl SettingsFile {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let games = if path.exists() {
            serde_json::from_str(&fs::read_to_string(path)?)?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            games,
        })
    }

    /// Opens the file, starting empty when it is missing or unreadable.
    pub fn open_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self::open(path).unwrap_or_else(|e| {
            log::warn!("Settings at {} unreadable, starting fresh: {}", path.display(), e);
            Self {
                path: Some(path.to_path_buf()),
                games: HashMap::new(),
            }
        })
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.games)?)?;
        Ok(())
    }

    pub fn game(&self, game: &str) -> Option<&GameSettings> {
        self.games.get(game)
    }

    fn update<F: FnOnce(&mut GameSettings)>(&mut self, game: &str, f: F) {
        f(self.games.entry(game.to_string()).or_default());
        if let Err(e) = self.save() {
            log::error!("Failed to save settings: {}", e);
        }
    }
}

impl SettingsStore for SettingsFile {
    fn installed_path(&self, game: &str) -> Option<PathBuf> {
        self.game(game).and_then(|g| g.installed_path.clone())
    }

    fn set_installed_path(&mut self, game: &str, path: &Path) {
        self.update(game, |g| g.installed_path = Some(path.to_path_buf()));
    }

    fn patched_hash(&self, game: &str) -> Option<String> {
        self.game(game).and_then(|g| g.patched_hash.clone())
    }

    fn set_patched_hash(&mut self, game: &str, hash: &str) {
        self.update(game, |g| g.patched_hash = Some(hash.to_string()));
    }

    fn patched_pattern(&self, game: &str) -> Option<String> {
        self.game(game).and_then(|g| g.patched_pattern.clone())
    }

    fn set_patched_pattern(&mut self, game: &str, pattern: &str) {
        self.update(game, |g| g.patched_pattern = Some(pattern.to_string()));
    }

    fn applied_patches(&self, game: &str) -> Vec<String> {
        self.game(game).map(|g| g.applied_patches.clone()).unwrap_or_default()
    }

    fn set_applied_patches(&mut self, game: &str, patches: &[String]) {
        self.update(game, |g| g.applied_patches = patches.to_vec());
    }

    fn last_platform(&self, game: &str) -> Option<Platform> {
        self.game(game).and_then(|g| g.last_platform)
    }

    fn set_last_platform(&mut self, game: &str, platform: Platform) {
        self.update(game, |g| g.last_platform = Some(platform));
    }

    fn patch_configuration(&self, game: &str) -> Option<PatchConfiguration> {
        self.game(game).and_then(|g| g.configuration.clone())
    }

    fn set_patch_configuration(&mut self, configuration: &PatchConfiguration) {
        self.update(&configuration.game, |g| g.configuration = Some(configuration.clone()));
    }
}
