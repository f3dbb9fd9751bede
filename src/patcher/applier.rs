// Thu Jan 16 2026 - Alex

use crate::catalog::PatchPattern;
use crate::memory::MappedFile;
use crate::patcher::backup::{create_backup, BackupPolicy};
use crate::patcher::oracle::{FileProbe, PatchStateOracle};
use crate::patcher::PatchError;
use crate::pattern::{decode_haystack, encode_haystack};
use crate::settings::SettingsStore;
use crate::utils::logging::scoped_timer;
use crate::utils::HashComputer;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Per-patch outcome of one batch, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchResults {
    results: IndexMap<String, bool>,
    writes: usize,
}

impl PatchResults {
    fn pending(names: &[&str]) -> Self {
        Self {
            results: names.iter().map(|n| (n.to_string(), false)).collect(),
            writes: 0,
        }
    }

    fn set(&mut self, name: &str, success: bool) {
        self.results.insert(name.to_string(), success);
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.results.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &bool)> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn all_succeeded(&self) -> bool {
        !self.results.is_empty() && self.results.values().all(|&ok| ok)
    }

    pub fn succeeded(&self) -> Vec<String> {
        self.results.iter().filter(|(_, &ok)| ok).map(|(n, _)| n.clone()).collect()
    }

    /// Flushed writes to the binary during this batch: zero or one.
    pub fn disk_writes(&self) -> usize {
        self.writes
    }

    pub fn into_map(self) -> IndexMap<String, bool> {
        self.results
    }
}

/// The actual binary: bundle directories hold it at `path_postfix`.
pub fn resolve_target(path: &Path, path_postfix: &str) -> PathBuf {
    if path.is_dir() && !path_postfix.is_empty() {
        path.join(path_postfix)
    } else {
        path.to_path_buf()
    }
}

pub struct BinaryPatchApplier<'a> {
    settings: &'a mut dyn SettingsStore,
    game: String,
}

impl<'a> BinaryPatchApplier<'a> {
    pub fn new(settings: &'a mut dyn SettingsStore, game: &str) -> Self {
        Self {
            settings,
            game: game.to_string(),
        }
    }

    /// Applies every patch it can. Failures end up as `false` entries and in
    /// the log, never as an error.
    pub fn apply_patches(
        &mut self,
        path: &Path,
        patches: &[(&str, &PatchPattern)],
        path_postfix: &str,
        backup: BackupPolicy,
    ) -> PatchResults {
        let mut results = PatchResults::pending(&patches.iter().map(|(n, _)| *n).collect::<Vec<_>>());

        if let Err(e) = self.run(path, patches, path_postfix, backup, &mut results) {
            log::error!("Patching {} failed: {}", path.display(), e);
        }

        results
    }

    /// Like `apply_patches` but reports the first hard failure as an error.
    pub fn try_apply_patches(
        &mut self,
        path: &Path,
        patches: &[(&str, &PatchPattern)],
        path_postfix: &str,
        backup: BackupPolicy,
    ) -> Result<PatchResults, PatchError> {
        let mut results = PatchResults::pending(&patches.iter().map(|(n, _)| *n).collect::<Vec<_>>());
        self.run(path, patches, path_postfix, backup, &mut results)?;
        Ok(results)
    }

    fn run(
        &mut self,
        path: &Path,
        patches: &[(&str, &PatchPattern)],
        path_postfix: &str,
        backup: BackupPolicy,
        results: &mut PatchResults,
    ) -> Result<(), PatchError> {
        let target = resolve_target(path, path_postfix);
        let pending = self.unresolved(&target, patches, results);

        if pending.is_empty() {
            log::info!("All requested patches are already applied");
            return Ok(());
        }

        if backup.create {
            create_backup(path, backup.overwrite).map_err(|source| PatchError::Backup {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let mut mapped = MappedFile::open_rw(&target).map_err(|source| PatchError::FileAccess {
            path: target.clone(),
            source,
        })?;

        let mut haystack = {
            let _timer = scoped_timer("hex encode");
            encode_haystack(mapped.as_slice())
        };

        let mut applied = Vec::new();
        let mut dirty = false;

        for (name, patch) in &pending {
            match apply_one(&mut haystack, name, patch) {
                Ok(()) => {
                    log::info!("Patch '{}' applied", name);
                    dirty |= !patch.hex_find.eq_ignore_ascii_case(&patch.hex_replace);
                    results.set(name, true);
                    applied.push((*name, *patch));
                }
                Err(e @ PatchError::NoMatch { .. }) => log::warn!("{}", e),
                Err(e) => log::error!("{}", e),
            }
        }

        let patched_bytes = if dirty {
            let bytes = decode_haystack(&haystack).map_err(crate::memory::MemoryError::from)?;
            mapped.write_all(&bytes)?;
            results.writes = mapped.write_count();
            Some(bytes)
        } else {
            None
        };
        drop(mapped);

        if applied.is_empty() {
            return Ok(());
        }

        let hash = match &patched_bytes {
            Some(bytes) => HashComputer::sha256_hex(bytes),
            None => HashComputer::sha256_file(&target).map_err(|source| PatchError::Hash {
                path: target.clone(),
                source,
            })?,
        };
        self.persist(&hash, &applied, results);

        Ok(())
    }

    /// Asks the oracle about every patch and returns the ones still to apply.
    fn unresolved<'p>(
        &self,
        target: &Path,
        patches: &[(&'p str, &'p PatchPattern)],
        results: &mut PatchResults,
    ) -> Vec<(&'p str, &'p PatchPattern)> {
        let oracle = PatchStateOracle::new(&*self.settings, &self.game);
        let mut probe = FileProbe::new(target);
        let mut pending = Vec::new();

        for &(name, patch) in patches {
            match oracle.check_probe(&mut probe, name, patch) {
                Ok(state) if state.is_patched() => {
                    log::info!("Patch '{}' is already applied, skipping", name);
                    results.set(name, true);
                }
                Ok(_) => pending.push((name, patch)),
                Err(e) => {
                    log::warn!("Could not verify patch '{}': {}", name, e);
                    pending.push((name, patch));
                }
            }
        }

        pending
    }

    fn persist(&mut self, hash: &str, applied: &[(&str, &PatchPattern)], results: &PatchResults) {
        self.settings.set_patched_hash(&self.game, hash);

        if let Some(Ok(reverse)) = applied.last().map(|(_, p)| p.compile_reverse()) {
            self.settings.set_patched_pattern(&self.game, reverse.source());
        }

        let mut names = self.settings.applied_patches(&self.game);
        for name in results.succeeded() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        self.settings.set_applied_patches(&self.game, &names);
        log::debug!("Recorded patched hash {}", hash);
    }
}

fn apply_one(haystack: &mut String, name: &str, patch: &PatchPattern) -> Result<(), PatchError> {
    let to_error = |source| PatchError::Pattern {
        name: name.to_string(),
        source,
    };
    let compiled = patch.compile_find().map_err(to_error)?;
    if compiled.patch(haystack, &patch.hex_replace).map_err(to_error)? {
        Ok(())
    } else {
        Err(PatchError::NoMatch { name: name.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patcher::backup::backup_path;
    use crate::patcher::oracle::PatchState;
    use crate::patcher::test_support::{patch_a, patch_b, patched_fixture, unpatched_fixture};
    use crate::settings::SettingsFile;
    use std::fs;

    fn write_exe(dir: &Path) -> PathBuf {
        let exe = dir.join("game.exe");
        fs::write(&exe, unpatched_fixture()).unwrap();
        exe
    }

    #[test]
    fn test_batch_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let exe = write_exe(dir.path());
        let (a, b) = (patch_a(), patch_b());
        let mut settings = SettingsFile::in_memory();

        let results = BinaryPatchApplier::new(&mut settings, "stellaris").apply_patches(
            &exe,
            &[("a", &a), ("b", &b)],
            "",
            BackupPolicy::default(),
        );

        assert!(results.all_succeeded());
        assert_eq!(results.disk_writes(), 1);
        assert_eq!(fs::read(&exe).unwrap(), patched_fixture());
        assert_eq!(settings.applied_patches("stellaris"), vec!["a", "b"]);
    }

    #[test]
    fn test_second_run_skips_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let exe = write_exe(dir.path());
        let a = patch_a();
        let mut settings = SettingsFile::in_memory();

        BinaryPatchApplier::new(&mut settings, "stellaris").apply_patches(&exe, &[("a", &a)], "", BackupPolicy::default());
        let before = fs::read(&exe).unwrap();

        let again = BinaryPatchApplier::new(&mut settings, "stellaris").apply_patches(
            &exe,
            &[("a", &a)],
            "",
            BackupPolicy::default(),
        );
        assert_eq!(again.get("a"), Some(true));
        assert_eq!(again.disk_writes(), 0);
        assert_eq!(fs::read(&exe).unwrap(), before);
    }

    #[test]
    fn test_hash_fast_path_after_patch() {
        let dir = tempfile::tempdir().unwrap();
        let exe = write_exe(dir.path());
        let a = patch_a();
        let mut settings = SettingsFile::in_memory();

        BinaryPatchApplier::new(&mut settings, "stellaris").apply_patches(&exe, &[("a", &a)], "", BackupPolicy::disabled());

        let oracle = PatchStateOracle::new(&settings, "stellaris");
        assert_eq!(oracle.check(&exe, "a", &a).unwrap(), PatchState::HashMatch);
        assert_eq!(settings.patched_pattern("stellaris").as_deref(), Some("488B1248.{20,26}33C0"));
    }

    #[test]
    fn test_miss_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let exe = write_exe(dir.path());
        let missing = PatchPattern::new("DEADBEEF%s", "85C0", "33C0");
        let before = HashComputer::sha256_file(&exe).unwrap();
        let mut settings = SettingsFile::in_memory();

        let results = BinaryPatchApplier::new(&mut settings, "stellaris").apply_patches(
            &exe,
            &[("missing", &missing)],
            "",
            BackupPolicy::default(),
        );

        assert_eq!(results.get("missing"), Some(false));
        assert_eq!(results.disk_writes(), 0);
        assert_eq!(HashComputer::sha256_file(&exe).unwrap(), before);
        assert_eq!(settings.patched_hash("stellaris"), None);
    }

    #[test]
    fn test_partial_batch_reports_each_patch() {
        let dir = tempfile::tempdir().unwrap();
        let exe = write_exe(dir.path());
        let a = patch_a();
        let missing = PatchPattern::new("DEADBEEF%s", "85C0", "33C0");
        let mut settings = SettingsFile::in_memory();

        let results = BinaryPatchApplier::new(&mut settings, "stellaris").apply_patches(
            &exe,
            &[("missing", &missing), ("a", &a)],
            "",
            BackupPolicy::disabled(),
        );

        let order: Vec<_> = results.iter().map(|(n, ok)| (n.as_str(), *ok)).collect();
        assert_eq!(order, vec![("missing", false), ("a", true)]);
        assert_eq!(settings.applied_patches("stellaris"), vec!["a"]);
    }

    #[test]
    fn test_backup_is_created_once() {
        let dir = tempfile::tempdir().unwrap();
        let exe = write_exe(dir.path());
        let (a, b) = (patch_a(), patch_b());
        let mut settings = SettingsFile::in_memory();

        BinaryPatchApplier::new(&mut settings, "stellaris").apply_patches(&exe, &[("a", &a)], "", BackupPolicy::default());
        assert_eq!(fs::read(backup_path(&exe)).unwrap(), unpatched_fixture());

        BinaryPatchApplier::new(&mut settings, "stellaris").apply_patches(&exe, &[("b", &b)], "", BackupPolicy::default());
        assert_eq!(fs::read(backup_path(&exe)).unwrap(), unpatched_fixture());
    }

    #[test]
    fn test_bundle_target_and_backup() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("game.app");
        fs::create_dir_all(app.join("Contents/MacOS")).unwrap();
        fs::write(app.join("Contents/MacOS/game"), unpatched_fixture()).unwrap();
        let a = patch_a();
        let mut settings = SettingsFile::in_memory();

        let results = BinaryPatchApplier::new(&mut settings, "stellaris").apply_patches(
            &app,
            &[("a", &a)],
            "Contents/MacOS/game",
            BackupPolicy::default(),
        );

        assert_eq!(results.get("a"), Some(true));
        assert_ne!(fs::read(app.join("Contents/MacOS/game")).unwrap(), unpatched_fixture());
        assert_eq!(
            fs::read(backup_path(&app).join("Contents/MacOS/game")).unwrap(),
            unpatched_fixture()
        );
    }

    #[test]
    fn test_missing_binary_fails_every_patch() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("absent.exe");
        let (a, b) = (patch_a(), patch_b());
        let mut settings = SettingsFile::in_memory();

        let results = BinaryPatchApplier::new(&mut settings, "stellaris").apply_patches(
            &exe,
            &[("a", &a), ("b", &b)],
            "",
            BackupPolicy::disabled(),
        );
        assert_eq!(results.succeeded(), Vec::<String>::new());
        assert_eq!(results.len(), 2);

        let err = BinaryPatchApplier::new(&mut settings, "stellaris")
            .try_apply_patches(&exe, &[("a", &a)], "", BackupPolicy::disabled())
            .unwrap_err();
        assert!(matches!(err, PatchError::FileAccess { .. }));
    }
}
