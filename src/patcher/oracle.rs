// Thu Jan 16 2026 - Alex

use crate::catalog::PatchPattern;
use crate::memory::map_readonly;
use crate::patcher::PatchError;
use crate::pattern::{encode_haystack, HexPattern};
use crate::settings::SettingsStore;
use crate::utils::logging::scoped_timer;
use crate::utils::HashComputer;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchState {
    /// Live hash equals the hash recorded after this patch was applied.
    HashMatch,
    /// The already-patched form of the pattern is present in the binary.
    PatternMatch,
    Unpatched,
}

impl PatchState {
    pub fn is_patched(&self) -> bool {
        !matches!(self, PatchState::Unpatched)
    }
}

/// Lazily computed views of one file, shared by the checks of a batch.
pub(crate) struct FileProbe {
    path: PathBuf,
    hash: Option<String>,
    haystack: Option<String>,
}

impl FileProbe {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            hash: None,
            haystack: None,
        }
    }

    fn hash(&mut self) -> Result<&str, PatchError> {
        if self.hash.is_none() {
            let hash = HashComputer::sha256_file(&self.path).map_err(|source| PatchError::Hash {
                path: self.path.clone(),
                source,
            })?;
            self.hash = Some(hash);
        }
        Ok(self.hash.as_deref().unwrap_or_default())
    }

    fn haystack(&mut self) -> Result<&str, PatchError> {
        if self.haystack.is_none() {
            let mmap = map_readonly(&self.path).map_err(|source| PatchError::FileAccess {
                path: self.path.clone(),
                source,
            })?;
            let _timer = scoped_timer("hex encode");
            self.haystack = Some(encode_haystack(&mmap));
        }
        Ok(self.haystack.as_deref().unwrap_or_default())
    }
}

/// Decides whether a patch is already present in a binary.
pub struct PatchStateOracle<'a> {
    settings: &'a dyn SettingsStore,
    game: &'a str,
}

impl<'a> PatchStateOracle<'a> {
    pub fn new(settings: &'a dyn SettingsStore, game: &'a str) -> Self {
        Self { settings, game }
    }

    /// Errors count as not patched.
    pub fn is_patched(&self, path: &Path, name: &str, patch: &PatchPattern) -> bool {
        match self.check(path, name, patch) {
            Ok(state) => state.is_patched(),
            Err(e) => {
                log::warn!("Could not verify patch '{}': {}", name, e);
                false
            }
        }
    }

    pub fn check(&self, path: &Path, name: &str, patch: &PatchPattern) -> Result<PatchState, PatchError> {
        self.check_probe(&mut FileProbe::new(path), name, patch)
    }

    pub(crate) fn check_probe(
        &self,
        probe: &mut FileProbe,
        name: &str,
        patch: &PatchPattern,
    ) -> Result<PatchState, PatchError> {
        let recorded = self.settings.applied_patches(self.game).iter().any(|n| n == name);

        if recorded {
            if let Some(stored) = self.settings.patched_hash(self.game) {
                if probe.hash()?.eq_ignore_ascii_case(&stored) {
                    log::debug!("'{}' confirmed by stored hash", name);
                    return Ok(PatchState::HashMatch);
                }
                log::debug!("Stored hash for {} does not match the live file", self.game);
            }
        }

        let reverse = match patch.compile_reverse() {
            Ok(reverse) => reverse,
            Err(source) => self.stored_fragment(patch).ok_or_else(|| PatchError::Pattern {
                name: name.to_string(),
                source,
            })?,
        };

        if reverse.is_match(probe.haystack()?) {
            log::debug!("'{}' found in patched form", name);
            return Ok(PatchState::PatternMatch);
        }

        Ok(PatchState::Unpatched)
    }

    /// The patched-form expression recorded by the last successful batch.
    fn stored_fragment(&self, patch: &PatchPattern) -> Option<HexPattern> {
        let stored = self.settings.patched_pattern(self.game)?;
        let pattern = HexPattern::compile(&stored, &patch.hex_replace).ok()?;
        log::debug!("Using stored pattern fragment for {}", self.game);
        Some(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patcher::test_support::{patch_a, patched_fixture, unpatched_fixture};
    use crate::settings::SettingsFile;
    use std::fs;

    #[test]
    fn test_unpatched_binary() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("game.exe");
        fs::write(&exe, unpatched_fixture()).unwrap();

        let settings = SettingsFile::in_memory();
        let oracle = PatchStateOracle::new(&settings, "stellaris");
        assert_eq!(oracle.check(&exe, "a", &patch_a()).unwrap(), PatchState::Unpatched);
        assert!(!oracle.is_patched(&exe, "a", &patch_a()));
    }

    #[test]
    fn test_pattern_fallback_when_hash_differs() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("game.exe");
        fs::write(&exe, patched_fixture()).unwrap();

        let mut settings = SettingsFile::in_memory();
        settings.set_patched_hash("stellaris", "h1-not-the-live-hash");
        settings.set_applied_patches("stellaris", &["a".to_string()]);

        let oracle = PatchStateOracle::new(&settings, "stellaris");
        assert_eq!(oracle.check(&exe, "a", &patch_a()).unwrap(), PatchState::PatternMatch);
    }

    #[test]
    fn test_hash_needs_patch_on_record() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("game.exe");
        fs::write(&exe, unpatched_fixture()).unwrap();
        let live = HashComputer::sha256_file(&exe).unwrap();

        let mut settings = SettingsFile::in_memory();
        settings.set_patched_hash("stellaris", &live);
        settings.set_applied_patches("stellaris", &["other".to_string()]);

        let oracle = PatchStateOracle::new(&settings, "stellaris");
        assert_eq!(oracle.check(&exe, "a", &patch_a()).unwrap(), PatchState::Unpatched);

        settings.set_applied_patches("stellaris", &["a".to_string()]);
        let oracle = PatchStateOracle::new(&settings, "stellaris");
        assert_eq!(oracle.check(&exe, "a", &patch_a()).unwrap(), PatchState::HashMatch);
    }

    #[test]
    fn test_stored_fragment_covers_broken_template() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("game.exe");
        fs::write(&exe, patched_fixture()).unwrap();

        let broken = PatchPattern::new("488B(1248.{20,26}%s", "85C0", "33C0");
        let mut settings = SettingsFile::in_memory();
        let oracle = PatchStateOracle::new(&settings, "stellaris");
        assert!(matches!(oracle.check(&exe, "a", &broken), Err(PatchError::Pattern { .. })));

        let fragment = patch_a().compile_reverse().unwrap();
        settings.set_patched_pattern("stellaris", fragment.source());
        let oracle = PatchStateOracle::new(&settings, "stellaris");
        assert_eq!(oracle.check(&exe, "a", &broken).unwrap(), PatchState::PatternMatch);
    }

    #[test]
    fn test_missing_file_is_not_patched() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsFile::in_memory();
        let oracle = PatchStateOracle::new(&settings, "stellaris");
        assert!(!oracle.is_patched(&dir.path().join("missing.exe"), "a", &patch_a()));
    }
}
