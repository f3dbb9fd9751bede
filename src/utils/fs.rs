// Wed Jan 15 2026 - Alex

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Access and modification times of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub accessed: SystemTime,
    pub modified: SystemTime,
}

impl FileStamp {
    pub fn capture<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let meta = fs::metadata(path)?;
        let modified = meta.modified()?;
        Ok(Self {
            accessed: meta.accessed().unwrap_or(modified),
            modified,
        })
    }

    pub fn restore<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::options().write(true).open(path)?;
        file.set_times(
            FileTimes::new()
                .set_accessed(self.accessed)
                .set_modified(self.modified),
        )
    }
}

/// Copies a file or a whole directory tree.
pub fn copy_entity(from: &Path, to: &Path) -> io::Result<()> {
    if from.is_dir() {
        copy_dir_recursive(from, to)
    } else {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to).map(|_| ())
    }
}

/// Follows symlinks, so linked directories inside bundles are copied as
/// real directories.
fn copy_dir_recursive(from: &Path, to: &Path) -> io::Result<()> {
    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

pub fn remove_entity(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Appends `suffix` to the full file name: `game.exe` becomes `game.exe.orig`.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// First path among `base`, `base_1`, `base_2`, ... that does not exist yet.
pub fn unused_path(base: &Path) -> PathBuf {
    if !base.exists() {
        return base.to_path_buf();
    }

    (1..)
        .map(|n| with_suffix(base, &format!("_{}", n)))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| base.to_path_buf())
}
