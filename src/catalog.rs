// Wed Jan 15 2026 - Alex

use crate::locator::GameExecutable;
use crate::pattern::{validate_template, HexPattern, PatternError};
use crate::platform::Platform;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unknown game: {0}")]
    UnknownGame(String),
    #[error("No patterns for {game} version {version}")]
    UnknownVersion { game: String, version: String },
    #[error("No patterns for {game} {version} on {platform}")]
    UnknownPlatform {
        game: String,
        version: String,
        platform: String,
    },
    #[error("Unknown patch: {0}")]
    UnknownPatch(String),
}

/// One hand-authored patch: a template plus the token it flips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchPattern {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub hex_find: String,
    pub hex_replace: String,
    pub patch_pattern: String,
}

impl PatchPattern {
    pub fn new(template: &str, hex_find: &str, hex_replace: &str) -> Self {
        Self {
            display_name: String::new(),
            description: String::new(),
            hex_find: hex_find.to_string(),
            hex_replace: hex_replace.to_string(),
            patch_pattern: template.to_string(),
        }
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = name.to_string();
        self
    }

    pub fn validate(&self) -> Result<(), PatternError> {
        validate_template(&self.patch_pattern, &self.hex_find, &self.hex_replace)
    }

    pub fn compile_find(&self) -> Result<HexPattern, PatternError> {
        HexPattern::compile(&self.patch_pattern, &self.hex_find)
    }

    /// The pattern as it reads after the patch was applied.
    pub fn compile_reverse(&self) -> Result<HexPattern, PatternError> {
        HexPattern::compile(&self.patch_pattern, &self.hex_replace)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub platform_name: String,
    #[serde(default)]
    pub description: String,
    pub exe_filename: String,
    #[serde(default, rename = "bin_path_postpend")]
    pub path_postfix: String,
    #[serde(default)]
    pub patches: IndexMap<String, PatchPattern>,
}

impl PlatformConfig {
    pub fn executable(&self, platform: Platform) -> GameExecutable {
        GameExecutable::for_platform(&self.exe_filename, &self.path_postfix, platform)
    }

    /// Looks up patches by name in the order given; no names selects all.
    pub fn select<'a>(&'a self, names: &[String]) -> Result<Vec<(&'a str, &'a PatchPattern)>, CatalogError> {
        if names.is_empty() {
            return Ok(self.patches.iter().map(|(k, v)| (k.as_str(), v)).collect());
        }

        names
            .iter()
            .map(|name| {
                self.patches
                    .get_key_value(name)
                    .map(|(k, v)| (k.as_str(), v))
                    .ok_or_else(|| CatalogError::UnknownPatch(name.clone()))
            })
            .collect()
    }

    /// Drops patches whose template or tokens are malformed and returns their names.
    fn retain_valid(&mut self, scope: &str) -> Vec<String> {
        let mut rejected = Vec::new();
        self.patches.retain(|name, patch| match patch.validate() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Ignoring patch '{}' in {}: {}", name, scope, e);
                rejected.push(name.clone());
                false
            }
        });
        rejected
    }
}

/// Keyed by platform: `windows`, `linux`, `macos`.
pub type PlatformDocument = IndexMap<String, PlatformConfig>;

/// Every known pattern: game, then version, then platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchCatalog {
    games: IndexMap<String, IndexMap<String, PlatformDocument>>,
}

impl PatchCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let mut catalog: PatchCatalog = serde_json::from_str(text)?;
        catalog.validate();
        Ok(catalog)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn insert(&mut self, game: &str, version: &str, platform_key: &str, config: PlatformConfig) {
        self.games
            .entry(game.to_string())
            .or_default()
            .entry(version.to_string())
            .or_default()
            .insert(platform_key.to_string(), config);
    }

    pub fn games(&self) -> impl Iterator<Item = &String> {
        self.games.keys()
    }

    pub fn versions(&self, game: &str) -> Vec<&String> {
        self.games.get(game).map(|v| v.keys().collect()).unwrap_or_default()
    }

    /// The last version listed for a game.
    pub fn latest_version(&self, game: &str) -> Option<&String> {
        self.games.get(game).and_then(|v| v.keys().last())
    }

    fn validate(&mut self) -> usize {
        let mut rejected = 0;
        for (game, versions) in self.games.iter_mut() {
            for (version, document) in versions.iter_mut() {
                for (platform, config) in document.iter_mut() {
                    let scope = format!("{} {} {}", game, version, platform);
                    rejected += config.retain_valid(&scope).len();
                }
            }
        }
        rejected
    }
}

/// Picks the platform config for a game and version without touching any state.
/// `None` selects the latest listed version.
pub fn resolve_platform_config(
    catalog: &PatchCatalog,
    platform: Platform,
    game: &str,
    version: Option<&str>,
) -> Result<PlatformConfig, CatalogError> {
    let versions = catalog
        .games
        .get(game)
        .ok_or_else(|| CatalogError::UnknownGame(game.to_string()))?;

    let (version, document) = match version {
        Some(v) => versions.get_key_value(v),
        None => versions.last(),
    }
    .ok_or_else(|| CatalogError::UnknownVersion {
        game: game.to_string(),
        version: version.unwrap_or("latest").to_string(),
    })?;

    document
        .get(platform.config_key())
        .cloned()
        .ok_or_else(|| CatalogError::UnknownPlatform {
            game: game.to_string(),
            version: version.clone(),
            platform: platform.to_string(),
        })
}
