// Fri Jan 17 2026 - Alex

use crate::feed::AchievementsSource;
use crate::save::archive::{extract, repack};
use crate::save::encoding::TextDocument;
use crate::save::gamestate::{AchievementsEdit, GameStateTextPatcher, IronmanEdit, IronmanMode};
use crate::save::SaveError;
use crate::utils::fs::{copy_entity, remove_entity, unused_path, FileStamp};
use std::path::{Path, PathBuf};

pub const SCRATCH_DIR: &str = "save_repair";
pub const GAMESTATE_ENTRY: &str = "gamestate";
pub const META_ENTRY: &str = "meta";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairOptions {
    pub update_achievements: bool,
    pub ironman: IronmanMode,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            update_achievements: true,
            ironman: IronmanMode::None,
        }
    }
}

impl RepairOptions {
    pub fn with_achievements(mut self, update: bool) -> Self {
        self.update_achievements = update;
        self
    }

    pub fn with_ironman(mut self, mode: IronmanMode) -> Self {
        self.ironman = mode;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairSummary {
    pub backup: PathBuf,
    pub achievements: Option<AchievementsEdit>,
    pub gamestate_ironman: IronmanEdit,
    pub meta_ironman: IronmanEdit,
    pub entries: usize,
}

pub struct SaveRepairer<'a> {
    backup_root: PathBuf,
    achievements: &'a dyn AchievementsSource,
}

impl<'a> SaveRepairer<'a> {
    pub fn new(backup_root: impl Into<PathBuf>, achievements: &'a dyn AchievementsSource) -> Self {
        Self {
            backup_root: backup_root.into(),
            achievements,
        }
    }

    /// Repairs the save in place. Failures are logged and reported as `false`.
    pub fn repair_save(&self, save: &Path, options: &RepairOptions) -> bool {
        match self.try_repair_save(save, options) {
            Ok(summary) => {
                log::info!("Save repaired, backup at {}", summary.backup.display());
                true
            }
            Err(SaveError::Structure(detail)) => {
                log::error!("{} is not a recognized save ({})", save.display(), detail);
                false
            }
            Err(e) => {
                log::error!("Repairing {} failed: {}", save.display(), e);
                false
            }
        }
    }

    pub fn try_repair_save(&self, save: &Path, options: &RepairOptions) -> Result<RepairSummary, SaveError> {
        let stamp = FileStamp::capture(save)?;
        let backup = self.backup(save)?;
        log::info!("Backed up {} to {}", save.display(), backup.display());

        let mut patcher = GameStateTextPatcher::new(options.ironman);
        if options.update_achievements {
            let block = self
                .achievements
                .fetch_latest_achievements_block()
                .ok_or(SaveError::AchievementsUnavailable)?;
            patcher = patcher.with_achievements(Some(block));
        }

        let scratch = save.parent().unwrap_or_else(|| Path::new(".")).join(SCRATCH_DIR);
        let result = self.rewrite(save, &scratch, &patcher, stamp);

        if scratch.exists() {
            if let Err(e) = remove_entity(&scratch) {
                log::warn!("Could not remove {}: {}", scratch.display(), e);
            }
        }

        let (achievements, gamestate_ironman, meta_ironman, entries) = result?;
        Ok(RepairSummary {
            backup,
            achievements,
            gamestate_ironman,
            meta_ironman,
            entries,
        })
    }

    fn rewrite(
        &self,
        save: &Path,
        scratch: &Path,
        patcher: &GameStateTextPatcher,
        stamp: FileStamp,
    ) -> Result<(Option<AchievementsEdit>, IronmanEdit, IronmanEdit, usize), SaveError> {
        if scratch.exists() {
            remove_entity(scratch)?;
        }
        let extracted = extract(save, scratch)?;

        if extracted.entry(GAMESTATE_ENTRY).is_none() {
            return Err(SaveError::MissingEntry(GAMESTATE_ENTRY.to_string()));
        }

        let gamestate_path = extracted.path_of(GAMESTATE_ENTRY);
        let mut gamestate = TextDocument::read(&gamestate_path)?;
        let outcome = patcher.process_gamestate(&gamestate.lines)?;
        gamestate.lines = outcome.lines;
        gamestate.write(&gamestate_path)?;
        log::debug!("gamestate written as {:?}", gamestate.encoding());

        let meta_ironman = if extracted.entry(META_ENTRY).is_some() {
            let meta_path = extracted.path_of(META_ENTRY);
            let mut meta = TextDocument::read(&meta_path)?;
            let meta_outcome = patcher.process_meta(&meta.lines);
            meta.lines = meta_outcome.lines;
            meta.write(&meta_path)?;
            meta_outcome.ironman
        } else {
            log::warn!("Save has no meta entry, skipping it");
            IronmanEdit::NotFound
        };

        let entries = repack(&extracted, save)?;
        stamp.restore(save)?;

        Ok((outcome.achievements, outcome.ironman, meta_ironman, entries))
    }

    /// Copies the save under `<root>/<save dir name>/<timestamp>/`.
    fn backup(&self, save: &Path) -> Result<PathBuf, SaveError> {
        let dir_name = save
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "saves".to_string());
        let file_name = save
            .file_name()
            .ok_or_else(|| SaveError::MissingEntry(save.display().to_string()))?;

        let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let target = unused_path(&self.backup_root.join(dir_name).join(timestamp));

        copy_entity(save, &target.join(file_name))?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::StaticAchievements;
    use crate::save::archive::tests::{read_entry, stamp_2024, write_save};
    use std::fs;
    use std::time::{Duration, SystemTime};

    const BLOCK: &str = "achievement={\n\t1 2 3\n}";

    const GAMESTATE: &str = "version=\"Cepheus v3.12\"\n\
        achievement={\n\
        \t7\n\
        }\n\
        clusters={\n\
        }\n\
        galaxy={\n\
        \ttemplate=\"huge\"\n\
        \tname=\"Milky\"\n\
        \tshape=\"elliptical\"\n\
        }\n";

    fn fixture(dir: &Path) -> PathBuf {
        let save_dir = dir.join("empire_123");
        fs::create_dir_all(&save_dir).unwrap();
        let save = save_dir.join("autosave.sav");
        write_save(&save, &[("meta", "version=1\nironman=no\n"), ("gamestate", GAMESTATE)]);
        save
    }

    #[test]
    fn test_full_repair() {
        let dir = tempfile::tempdir().unwrap();
        let save = fixture(dir.path());
        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_650_000_000);
        FileStamp { accessed: old, modified: old }.restore(&save).unwrap();

        let source = StaticAchievements(BLOCK.to_string());
        let repairer = SaveRepairer::new(dir.path().join("backups"), &source);
        let options = RepairOptions::default().with_ironman(IronmanMode::ForceAdd);

        let summary = repairer.try_repair_save(&save, &options).unwrap();

        assert_eq!(summary.achievements, Some(AchievementsEdit::Replaced));
        assert_eq!(summary.gamestate_ironman, IronmanEdit::Inserted);
        assert_eq!(summary.meta_ironman, IronmanEdit::Rewritten);
        assert_eq!(summary.entries, 2);

        let (gamestate, modified) = read_entry(&save, "gamestate");
        assert!(gamestate.contains("achievement={\n\t1 2 3\n}\nclusters={"));
        assert!(gamestate.contains("\tname=\"Milky\"\n\tironman=yes\n\tshape"));
        assert!(!gamestate.contains("\t7\n"));
        assert_eq!(modified.unwrap().year(), stamp_2024().year());
        assert_eq!(read_entry(&save, "meta").0, "version=1\nironman=yes\n");

        assert_eq!(FileStamp::capture(&save).unwrap().modified, old);
        assert!(!save.parent().unwrap().join(SCRATCH_DIR).exists());

        assert!(summary.backup.starts_with(dir.path().join("backups").join("empire_123")));
        let original = summary.backup.join("autosave.sav");
        assert_eq!(read_entry(&original, "gamestate").0, GAMESTATE);
    }

    #[test]
    fn test_second_repair_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let save = fixture(dir.path());
        let source = StaticAchievements(BLOCK.to_string());
        let repairer = SaveRepairer::new(dir.path().join("backups"), &source);
        let options = RepairOptions::default().with_ironman(IronmanMode::ForceAdd);

        repairer.try_repair_save(&save, &options).unwrap();
        let first = read_entry(&save, "gamestate").0;
        let summary = repairer.try_repair_save(&save, &options).unwrap();

        assert_eq!(read_entry(&save, "gamestate").0, first);
        assert_eq!(summary.gamestate_ironman, IronmanEdit::Unchanged);
        assert_eq!(summary.meta_ironman, IronmanEdit::Unchanged);
        assert_ne!(summary.backup.file_name(), None);
    }

    #[test]
    fn test_missing_achievements_fails_without_touching_save() {
        let dir = tempfile::tempdir().unwrap();
        let save = fixture(dir.path());
        let before = fs::read(&save).unwrap();

        let source = StaticAchievements(String::new());
        let repairer = SaveRepairer::new(dir.path().join("backups"), &source);

        assert!(!repairer.repair_save(&save, &RepairOptions::default()));
        assert_eq!(fs::read(&save).unwrap(), before);
    }

    #[test]
    fn test_unrecognized_save_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let save = dir.path().join("odd.sav");
        write_save(&save, &[("gamestate", "foo=1\n"), ("meta", "version=1\n")]);
        let before = fs::read(&save).unwrap();

        let source = StaticAchievements(BLOCK.to_string());
        let repairer = SaveRepairer::new(dir.path().join("backups"), &source);
        let err = repairer.try_repair_save(&save, &RepairOptions::default()).unwrap_err();

        assert!(matches!(err, SaveError::Structure(_)));
        assert_eq!(fs::read(&save).unwrap(), before);
        assert!(!dir.path().join(SCRATCH_DIR).exists());
    }

    #[test]
    fn test_corrupt_save_fails() {
        let dir = tempfile::tempdir().unwrap();
        let save = dir.path().join("broken.sav");
        fs::write(&save, b"garbage").unwrap();

        let source = StaticAchievements(BLOCK.to_string());
        let repairer = SaveRepairer::new(dir.path().join("backups"), &source);
        assert!(!repairer.repair_save(&save, &RepairOptions::default().with_achievements(false)));
    }
}
