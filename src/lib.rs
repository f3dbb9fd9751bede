// Tue Jan 15 2026 - Alex

pub mod catalog;
pub mod config;
pub mod context;
pub mod feed;
pub mod locator;
pub mod memory;
pub mod patcher;
pub mod pattern;
pub mod platform;
pub mod save;
pub mod settings;
pub mod ui;
pub mod utils;

pub use catalog::{resolve_platform_config, PatchCatalog, PatchPattern, PlatformConfig};
pub use config::AppConfig;
pub use context::AppContext;
pub use feed::{AchievementsSource, RemoteFeed};
pub use locator::{GameBinaryLocator, GameExecutable, InstallLocator};
pub use patcher::{BinaryPatchApplier, PatchResults, PatchStateOracle};
pub use pattern::HexPattern;
pub use platform::Platform;
pub use save::{GameStateTextPatcher, IronmanMode, SaveRepairer};
pub use settings::{PatchConfiguration, SettingsFile, SettingsStore};
