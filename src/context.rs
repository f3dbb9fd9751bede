// Fri Jan 17 2026 - Alex

use crate::catalog::{resolve_platform_config, PatchCatalog, PlatformConfig};
use crate::config::AppConfig;
use crate::feed::{FeedAchievements, FeedError, PatternSource, RemoteFeed};
use crate::locator::{GameBinaryLocator, InstallLocator, KnownLibraryLocator, SettingsInstallLocator};
use crate::platform::Platform;
use crate::settings::{SettingsFile, SettingsStore};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Everything a command needs, built once at startup.
pub struct AppContext {
    pub config: AppConfig,
    pub settings: SettingsFile,
    pub platform: Platform,
}

impl AppContext {
    pub fn new(config: AppConfig, platform: Platform) -> Self {
        let settings = match &config.settings_path {
            Some(path) => SettingsFile::open_or_default(path),
            None => SettingsFile::in_memory(),
        };

        Self {
            config,
            settings,
            platform,
        }
    }

    /// Context with throwaway settings.
    pub fn in_memory(config: AppConfig, platform: Platform) -> Self {
        Self {
            config: config.with_settings_path(None),
            settings: SettingsFile::in_memory(),
            platform,
        }
    }

    pub fn game(&self) -> &str {
        &self.config.game
    }

    fn feed(&self, url: &Option<String>, cache: &Path) -> RemoteFeed {
        RemoteFeed::new(url.clone(), cache.to_path_buf())
            .with_timeout(self.config.feed_timeout())
            .with_cooldown(self.config.feed_cooldown())
            .with_local_only(self.config.local_only)
    }

    pub fn pattern_source(&self) -> PatternSource {
        PatternSource::new(self.feed(&self.config.patterns_url, &self.config.patterns_cache))
    }

    pub fn achievements_source(&self) -> FeedAchievements {
        FeedAchievements::new(self.feed(&self.config.achievements_url, &self.config.achievements_cache))
    }

    pub fn load_catalog(&self) -> Result<PatchCatalog, FeedError> {
        self.pattern_source().load_catalog()
    }

    pub fn platform_config(&self, catalog: &PatchCatalog) -> Result<PlatformConfig> {
        resolve_platform_config(catalog, self.platform, self.game(), self.config.version.as_deref())
            .with_context(|| format!("No patch configuration for {} on {}", self.game(), self.platform))
    }

    /// Finds the executable from the hint, the remembered install or the
    /// default libraries, and remembers the install on success.
    pub fn locate_executable(&mut self, hint: Option<&Path>, platform_config: &PlatformConfig) -> Option<PathBuf> {
        let exe = platform_config.executable(self.platform);
        let game = self.config.game.clone();

        let found = {
            let remembered = SettingsInstallLocator::new(&self.settings);
            let libraries = KnownLibraryLocator::for_platform(self.platform);
            let locators: [&dyn InstallLocator; 2] = [&remembered, &libraries];
            GameBinaryLocator::locate(hint, || GameBinaryLocator::discover_with(&locators, &game), &exe)
        };

        if let Some(path) = &found {
            if let Some(dir) = path.parent() {
                self.settings.set_installed_path(&game, dir);
            }
            self.settings.set_last_platform(&game, self.platform);
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config(dir: &Path) -> AppConfig {
        AppConfig::new()
            .with_local_only(true)
            .with_patterns_cache(dir.join("patterns.json"))
            .with_achievements_cache(dir.join("achievements.txt"))
    }

    #[test]
    fn test_catalog_through_context() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("patterns.json"),
            r#"{"stellaris": {"3.12": {"windows": {"exe_filename": "stellaris.exe", "patches": {}}}}}"#,
        )
        .unwrap();

        let ctx = AppContext::in_memory(config(dir.path()), Platform::LinuxProton);
        let catalog = ctx.load_catalog().unwrap();
        let platform_config = ctx.platform_config(&catalog).unwrap();
        assert_eq!(platform_config.exe_filename, "stellaris.exe");
    }

    #[test]
    fn test_locate_remembers_install() {
        let dir = tempfile::tempdir().unwrap();
        let install = dir.path().join("Stellaris");
        fs::create_dir_all(&install).unwrap();
        fs::write(install.join("stellaris"), b"bin").unwrap();

        let mut ctx = AppContext::in_memory(config(dir.path()), Platform::LinuxNative);
        let platform_config = PlatformConfig {
            exe_filename: "stellaris".into(),
            ..Default::default()
        };

        let found = ctx.locate_executable(Some(&install), &platform_config).unwrap();
        assert_eq!(found, install.join("stellaris"));
        assert_eq!(ctx.settings.installed_path("stellaris"), Some(install.clone()));

        let again = ctx.locate_executable(None, &platform_config).unwrap();
        assert_eq!(again, found);
        assert_eq!(ctx.settings.last_platform("stellaris"), Some(Platform::LinuxNative));
    }
}
