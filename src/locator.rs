// Wed Jan 15 2026 - Alex

use crate::platform::Platform;
use crate::settings::SettingsStore;
use std::path::{Path, PathBuf};

/// Executable name relative to an install directory.
///
/// `path_postfix` is set for bundle executables only: the located entity is
/// the `.app` directory and the binary lives at `path_postfix` inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameExecutable {
    pub filename: String,
    pub path_postfix: String,
}

impl GameExecutable {
    pub fn new(filename: &str, path_postfix: &str) -> Self {
        Self {
            filename: filename.to_string(),
            path_postfix: path_postfix.to_string(),
        }
    }

    pub fn for_platform(filename: &str, path_postfix: &str, platform: Platform) -> Self {
        let filename = if platform.uses_windows_binary() && Path::new(filename).extension().is_none() {
            format!("{}.exe", filename)
        } else {
            filename.to_string()
        };
        Self::new(&filename, path_postfix)
    }

    pub fn is_bundle(&self) -> bool {
        !self.path_postfix.is_empty()
    }

    pub fn resolve(&self, install_dir: &Path) -> PathBuf {
        install_dir.join(&self.filename)
    }
}

/// Finds where a game is installed. Library scanning lives behind this trait.
pub trait InstallLocator {
    fn locate_game_install(&self, game: &str) -> Option<PathBuf>;
}

/// Uses the install path remembered from an earlier run.
pub struct SettingsInstallLocator<'a> {
    settings: &'a dyn SettingsStore,
}

impl<'a> SettingsInstallLocator<'a> {
    pub fn new(settings: &'a dyn SettingsStore) -> Self {
        Self { settings }
    }
}

impl InstallLocator for SettingsInstallLocator<'_> {
    fn locate_game_install(&self, game: &str) -> Option<PathBuf> {
        self.settings.installed_path(game).filter(|p| p.is_dir())
    }
}

/// Probes the default Steam library roots of the host.
pub struct KnownLibraryLocator {
    roots: Vec<PathBuf>,
}

impl KnownLibraryLocator {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn for_platform(platform: Platform) -> Self {
        let mut roots = Vec::new();
        let home = dirs::home_dir();

        match platform {
            Platform::Windows => {
                roots.push(PathBuf::from(r"C:\Program Files (x86)\Steam"));
                roots.push(PathBuf::from(r"C:\Program Files\Steam"));
            }
            Platform::LinuxNative | Platform::LinuxProton => {
                if let Some(home) = &home {
                    roots.push(home.join(".steam/steam"));
                    roots.push(home.join(".local/share/Steam"));
                    roots.push(home.join(".var/app/com.valvesoftware.Steam/.local/share/Steam"));
                }
            }
            Platform::MacOS => {
                if let Some(home) = &home {
                    roots.push(home.join("Library/Application Support/Steam"));
                }
            }
        }

        Self { roots }
    }

    fn folder_name(game: &str) -> String {
        let mut chars = game.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl InstallLocator for KnownLibraryLocator {
    fn locate_game_install(&self, game: &str) -> Option<PathBuf> {
        let folder = Self::folder_name(game);
        self.roots
            .iter()
            .map(|root| root.join("steamapps").join("common").join(&folder))
            .find(|candidate| candidate.is_dir())
    }
}

pub struct GameBinaryLocator;

impl GameBinaryLocator {
    /// Resolves the executable from a hint or, failing that, from `discover`.
    /// `discover` returns an install directory. No retries.
    pub fn locate<F>(install_dir_hint: Option<&Path>, discover: F, exe: &GameExecutable) -> Option<PathBuf>
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        if let Some(hint) = install_dir_hint {
            let candidate = exe.resolve(hint);
            if candidate.exists() {
                return Some(candidate);
            }
            log::warn!("{} not found in {}", exe.filename, hint.display());
            return None;
        }

        let install_dir = discover()?;
        let candidate = exe.resolve(&install_dir);
        if candidate.exists() {
            log::info!("Found game executable at {}", candidate.display());
            Some(candidate)
        } else {
            log::warn!("{} not found in discovered install {}", exe.filename, install_dir.display());
            None
        }
    }

    /// Tries each locator in turn until one finds the install directory.
    pub fn discover_with(locators: &[&dyn InstallLocator], game: &str) -> Option<PathBuf> {
        locators.iter().find_map(|l| l.locate_game_install(game))
    }
}
