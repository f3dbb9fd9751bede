// Wed Jan 15 2026 - Alex

use crate::platform::Platform;
use crate::save::IronmanMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pdx-patcher")]
#[command(author = "Alex")]
#[command(version)]
#[command(about = "Achievement enabler and save repair for Paradox games", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true)]
    pub no_color: bool,

    /// Never touch the network, use cached feeds only
    #[arg(long, global = true)]
    pub local_only: bool,

    #[arg(short, long, global = true)]
    pub game: Option<String>,

    /// Game version in the pattern catalog; latest when omitted
    #[arg(long = "game-version", global = true)]
    pub game_version: Option<String>,

    /// Patch the Windows binary run through Proton
    #[arg(long, global = true)]
    pub proton: bool,

    #[arg(long, global = true)]
    pub platform: Option<Platform>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply binary patches to the game executable
    Patch(PatchArgs),
    /// Show which patches are present in the executable
    Status(InstallArgs),
    /// Find the game executable
    Locate(InstallArgs),
    /// List the patches known for this game and platform
    ListPatches,
    /// Update achievements and ironman flags in a save archive
    RepairSave(RepairSaveArgs),
}

#[derive(Parser, Debug)]
pub struct InstallArgs {
    #[arg(short, long)]
    pub install_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct PatchArgs {
    #[arg(short, long)]
    pub install_dir: Option<PathBuf>,

    /// Patch name from the catalog; repeat for several, omit for all
    #[arg(short, long = "patch")]
    pub patches: Vec<String>,

    #[arg(long)]
    pub no_backup: bool,

    #[arg(long, conflicts_with = "no_backup")]
    pub overwrite_backup: bool,
}

#[derive(Parser, Debug)]
pub struct RepairSaveArgs {
    pub save: PathBuf,

    #[arg(long)]
    pub no_achievements: bool,

    /// none, enable, disable or force
    #[arg(long, default_value = "none")]
    pub ironman: IronmanMode,

    #[arg(long)]
    pub backup_dir: Option<PathBuf>,
}

impl RepairSaveArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.save.is_file() {
            return Err(format!("Save file does not exist: {:?}", self.save));
        }
        if self.no_achievements && self.ironman == IronmanMode::None {
            return Err("Nothing to do: achievements disabled and no ironman mode given".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_patch_command() {
        let args = Args::try_parse_from([
            "pdx-patcher", "--game", "stellaris", "patch", "-p", "achievements", "-p", "checksum", "--no-backup",
        ])
        .unwrap();

        assert_eq!(args.game.as_deref(), Some("stellaris"));
        match args.command {
            Command::Patch(patch) => {
                assert_eq!(patch.patches, vec!["achievements", "checksum"]);
                assert!(patch.no_backup);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_repair_save() {
        let args = Args::try_parse_from(["pdx-patcher", "repair-save", "save.sav", "--ironman", "force", "--local-only"])
            .unwrap();

        assert!(args.local_only);
        match args.command {
            Command::RepairSave(repair) => {
                assert_eq!(repair.ironman, IronmanMode::ForceAdd);
                assert!(!repair.no_achievements);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_backup_flags_conflict() {
        assert!(Args::try_parse_from(["pdx-patcher", "patch", "--no-backup", "--overwrite-backup"]).is_err());
    }
}
