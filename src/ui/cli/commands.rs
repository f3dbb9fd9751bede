// Wed Jan 15 2026 - Alex

use super::args::{InstallArgs, PatchArgs, RepairSaveArgs};
use crate::catalog::PlatformConfig;
use crate::context::AppContext;
use crate::patcher::{backup_path, resolve_target, BackupPolicy, BinaryPatchApplier, PatchStateOracle};
use crate::platform::Platform;
use crate::save::{RepairOptions, SaveRepairer};
use crate::settings::{PatchConfiguration, SettingsStore};
use crate::ui::{print_error, print_info, print_success, print_warning, ProgressManager};
use crate::utils::{format_bytes, pluralize};
use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

fn require_executable(ctx: &mut AppContext, hint: Option<&Path>, config: &PlatformConfig) -> Result<PathBuf> {
    ctx.locate_executable(hint, config).ok_or_else(|| {
        anyhow!(
            "Could not find {} for {}. Pass --install-dir with the game's folder",
            config.exe_filename,
            ctx.game()
        )
    })
}

fn label_of<'a>(name: &'a str, display_name: &'a str) -> &'a str {
    if display_name.is_empty() {
        name
    } else {
        display_name
    }
}

fn load_platform_config(ctx: &AppContext, progress: &ProgressManager) -> Result<PlatformConfig> {
    let catalog = progress
        .run("Fetching patch patterns...", || ctx.load_catalog())
        .context("Pattern catalog unavailable")?;
    ctx.platform_config(&catalog)
}

pub fn patch(ctx: &mut AppContext, progress: &ProgressManager, args: PatchArgs) -> Result<()> {
    let choice = PatchConfiguration::new(ctx.game())
        .with_version(ctx.config.version.clone())
        .with_proton(ctx.platform == Platform::LinuxProton)
        .with_selected_patches(args.patches.clone())
        .merged_with(ctx.settings.patch_configuration(ctx.game()).as_ref());
    ctx.config.version = choice.version.clone();

    let config = load_platform_config(ctx, progress)?;
    let path = require_executable(ctx, args.install_dir.as_deref(), &config)?;
    let selected = config.select(&choice.selected_patches)?;

    if selected.is_empty() {
        bail!("No patches defined for {} on {}", ctx.game(), ctx.platform);
    }

    print_info(&format!(
        "Patching {} with {}",
        path.display(),
        pluralize(selected.len(), "patch", "patches")
    ));

    let policy = if args.no_backup {
        BackupPolicy::disabled()
    } else {
        BackupPolicy::default().with_overwrite(args.overwrite_backup)
    };

    let game = ctx.config.game.clone();
    let results = progress.run("Applying patches...", || {
        BinaryPatchApplier::new(&mut ctx.settings, &game).apply_patches(&path, &selected, &config.path_postfix, policy)
    });

    for (name, ok) in results.iter() {
        if *ok {
            print_success(&format!("{}", name.green()));
        } else {
            print_error(&format!("{} failed", name.red()));
        }
    }

    if policy.create {
        print_info(&format!("Backup: {}", backup_path(&path).display()));
    }

    ctx.settings.set_patch_configuration(&choice);

    let failed = results.len() - results.succeeded().len();
    if failed > 0 {
        bail!("{} of {} failed, see the log above", failed, pluralize(results.len(), "patch", "patches"));
    }

    print_success("All patches applied");
    Ok(())
}

pub fn status(ctx: &mut AppContext, progress: &ProgressManager, args: InstallArgs) -> Result<()> {
    let config = load_platform_config(ctx, progress)?;
    let path = require_executable(ctx, args.install_dir.as_deref(), &config)?;
    let target = resolve_target(&path, &config.path_postfix);

    let size = std::fs::metadata(&target).map(|m| m.len()).unwrap_or(0);
    print_info(&format!("{} ({})", target.display(), format_bytes(size)));

    let game = ctx.game();
    if let Some(hash) = ctx.settings.patched_hash(game) {
        println!("  Recorded hash:    {}", hash.dimmed());
    }
    if let Some(pattern) = ctx.settings.patched_pattern(game) {
        println!("  Recorded pattern: {}", pattern.dimmed());
    }

    let oracle = PatchStateOracle::new(&ctx.settings, game);
    for (name, patch) in &config.patches {
        let label = label_of(name, &patch.display_name);
        let state = progress.run(&format!("Checking {}...", label), || oracle.check(&target, name, patch));
        match state {
            Ok(state) if state.is_patched() => println!("  {} {} ({:?})", "[+]".green(), label, state),
            Ok(_) => println!("  {} {}", "[ ]".yellow(), label),
            Err(e) => println!("  {} {}: {}", "[!]".red(), label, e),
        }
    }

    if backup_path(&path).exists() {
        print_info(&format!("Backup present at {}", backup_path(&path).display()));
    }

    Ok(())
}

pub fn locate(ctx: &mut AppContext, progress: &ProgressManager, args: InstallArgs) -> Result<()> {
    let config = load_platform_config(ctx, progress)?;
    let path = require_executable(ctx, args.install_dir.as_deref(), &config)?;
    print_success(&format!("{}", path.display()));
    Ok(())
}

pub fn list_patches(ctx: &mut AppContext, progress: &ProgressManager) -> Result<()> {
    let catalog = progress
        .run("Fetching patch patterns...", || ctx.load_catalog())
        .context("Pattern catalog unavailable")?;

    let versions = catalog.versions(ctx.game());
    if versions.is_empty() {
        print_warning(&format!("No patterns for {}", ctx.game()));
        return Ok(());
    }
    let listed: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();
    print_info(&format!("{} versions: {}", ctx.game(), listed.join(", ")));

    let config = ctx.platform_config(&catalog)?;
    println!("{}", format!("Patches for {}:", ctx.platform).yellow().bold());
    for (name, patch) in &config.patches {
        println!("  {} {}", name.cyan(), label_of(name, &patch.display_name));
        if !patch.description.is_empty() {
            println!("      {}", patch.description.dimmed());
        }
    }

    Ok(())
}

pub fn repair_save(ctx: &mut AppContext, progress: &ProgressManager, args: RepairSaveArgs) -> Result<()> {
    args.validate().map_err(|e| anyhow!(e))?;

    let source = ctx.achievements_source();
    let backup_root = args.backup_dir.clone().unwrap_or_else(|| ctx.config.save_backup_dir.clone());
    let repairer = SaveRepairer::new(backup_root, &source);
    let options = RepairOptions::default()
        .with_achievements(!args.no_achievements)
        .with_ironman(args.ironman);

    let summary = progress
        .run("Repairing save...", || repairer.try_repair_save(&args.save, &options))
        .with_context(|| format!("Repairing {} failed", args.save.display()))?;

    if let Some(edit) = summary.achievements {
        print_success(&format!("Achievements block {:?}", edit).to_lowercase());
    }
    if args.ironman != crate::save::IronmanMode::None {
        print_info(&format!(
            "Ironman: gamestate {}, meta {}",
            summary.gamestate_ironman, summary.meta_ironman
        ));
    }
    print_success(&format!(
        "Repacked {} into {}",
        pluralize(summary.entries, "entry", "entries"),
        args.save.display()
    ));
    print_info(&format!("Original kept in {}", summary.backup.display()));
    Ok(())
}
