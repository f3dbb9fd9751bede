// Wed Jan 15 2026 - Alex

use super::args::{Args, Command};
use super::commands;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::platform::Platform;
use crate::ui::banner::Banner;
use crate::ui::progress::ProgressManager;
use crate::utils::LoggingUtils;
use anyhow::Context;

pub struct CommandHandler;

impl CommandHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, args: Args) -> anyhow::Result<()> {
        self.setup_logging(&args);

        if !args.quiet {
            Banner::default().with_color(!args.no_color).print();
        }

        let config = self.load_config(&args)?;
        let platform = args.platform.unwrap_or_else(|| Platform::detect(args.proton));
        log::debug!("Platform: {}, game: {}", platform, config.game);

        let mut ctx = AppContext::new(config, platform);
        let progress = ProgressManager::new().with_enabled(!args.quiet);

        match args.command {
            Command::Patch(patch_args) => commands::patch(&mut ctx, &progress, patch_args),
            Command::Status(install_args) => commands::status(&mut ctx, &progress, install_args),
            Command::Locate(install_args) => commands::locate(&mut ctx, &progress, install_args),
            Command::ListPatches => commands::list_patches(&mut ctx, &progress),
            Command::RepairSave(repair_args) => commands::repair_save(&mut ctx, &progress, repair_args),
        }
    }

    fn setup_logging(&self, args: &Args) {
        let level = if args.quiet {
            log::LevelFilter::Warn
        } else {
            LoggingUtils::level_from_str(&args.log_level)
        };
        LoggingUtils::init_logger(level, !args.no_color);
    }

    /// File config with command-line overrides on top.
    fn load_config(&self, args: &Args) -> anyhow::Result<AppConfig> {
        let path = args.config.clone().unwrap_or_else(AppConfig::default_path);
        let mut config = AppConfig::load_or_default(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;

        if let Some(game) = &args.game {
            config = config.with_game(game);
        }
        if args.game_version.is_some() {
            config = config.with_version(args.game_version.clone());
        }
        if args.local_only {
            config = config.with_local_only(true);
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
