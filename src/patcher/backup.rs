// Thu Jan 16 2026 - Alex

use crate::utils::fs::{copy_entity, remove_entity, with_suffix};
use std::io;
use std::path::{Path, PathBuf};

pub const BACKUP_SUFFIX: &str = ".orig";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupPolicy {
    pub create: bool,
    pub overwrite: bool,
}

impl Default for BackupPolicy {
    fn default() -> Self {
        Self {
            create: true,
            overwrite: false,
        }
    }
}

impl BackupPolicy {
    pub fn disabled() -> Self {
        Self {
            create: false,
            overwrite: false,
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupStatus {
    Created(PathBuf),
    Kept(PathBuf),
}

pub fn backup_path(entity: &Path) -> PathBuf {
    with_suffix(entity, BACKUP_SUFFIX)
}

/// Copies a file or bundle directory to `<entity>.orig`.
///
/// An existing backup is left alone unless `overwrite` is set.
pub fn create_backup(entity: &Path, overwrite: bool) -> io::Result<BackupStatus> {
    let target = backup_path(entity);

    if target.exists() {
        if !overwrite {
            log::info!("Backup already exists at {}, keeping it", target.display());
            return Ok(BackupStatus::Kept(target));
        }
        remove_entity(&target)?;
    }

    copy_entity(entity, &target)?;
    log::info!("Created backup at {}", target.display());
    Ok(BackupStatus::Created(target))
}
