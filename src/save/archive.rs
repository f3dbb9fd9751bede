// Fri Jan 17 2026 - Alex

use crate::save::SaveError;
use crate::utils::fs::{with_suffix, FileStamp};
use chrono::{Datelike, Local, NaiveDate, TimeZone, Timelike};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

#[derive(Debug, Clone)]
pub struct ExtractedEntry {
    /// Archive name, `/` separated.
    pub name: String,
    pub stamp: FileStamp,
    pub modified: Option<DateTime>,
}

#[derive(Debug, Clone)]
pub struct ExtractedSave {
    pub dir: PathBuf,
    pub entries: Vec<ExtractedEntry>,
}

impl ExtractedSave {
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn entry(&self, name: &str) -> Option<&ExtractedEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

/// Unpacks every file of `archive` into `dest`.
///
/// Extracted files take the entry's stored modification time, which is then
/// recorded so `repack` can put it back.
pub fn extract(archive: &Path, dest: &Path) -> Result<ExtractedSave, SaveError> {
    let mut zip = ZipArchive::new(BufReader::new(File::open(archive)?))?;
    fs::create_dir_all(dest)?;

    let mut entries = Vec::with_capacity(zip.len());

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let relative = match entry.enclosed_name() {
            Some(p) => p.to_path_buf(),
            None => {
                log::warn!("Skipping unsafe archive entry '{}'", entry.name());
                continue;
            }
        };

        let target = dest.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        {
            let mut out = BufWriter::new(File::create(&target)?);
            io::copy(&mut entry, &mut out)?;
        }

        let modified = entry.last_modified();
        if let Some(time) = modified.and_then(to_system_time) {
            FileStamp { accessed: time, modified: time }.restore(&target)?;
        }

        entries.push(ExtractedEntry {
            name: entry_name(&relative),
            stamp: FileStamp::capture(&target)?,
            modified,
        });
    }

    log::debug!("Extracted {} entries from {}", entries.len(), archive.display());

    Ok(ExtractedSave {
        dir: dest.to_path_buf(),
        entries,
    })
}

/// Zips the current contents of `save.dir` into `archive`.
///
/// Known entries keep their original order and times; files added since
/// extraction follow in name order. The archive is replaced in one rename.
pub fn repack(save: &ExtractedSave, archive: &Path) -> Result<usize, SaveError> {
    let mut current = collect_files(&save.dir)?;
    current.sort();

    let mut ordered: Vec<String> = save
        .entries
        .iter()
        .map(|e| e.name.clone())
        .filter(|n| current.contains(n))
        .collect();
    for name in current {
        if !ordered.contains(&name) {
            ordered.push(name);
        }
    }

    let temp = with_suffix(archive, ".tmp");
    let result = write_archive(save, &ordered, &temp);
    if let Err(e) = result {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }

    fs::rename(&temp, archive)?;
    log::debug!("Repacked {} entries into {}", ordered.len(), archive.display());
    Ok(ordered.len())
}

fn write_archive(save: &ExtractedSave, names: &[String], temp: &Path) -> Result<(), SaveError> {
    let mut zip = ZipWriter::new(BufWriter::new(File::create(temp)?));

    for name in names {
        let path = save.path_of(name);
        let known = save.entry(name);

        if let Some(entry) = known {
            entry.stamp.restore(&path)?;
        }

        let modified = known
            .and_then(|e| e.modified)
            .or_else(|| fs::metadata(&path).and_then(|m| m.modified()).ok().and_then(to_zip_time));

        let mut options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        if let Some(time) = modified {
            options = options.last_modified_time(time);
        }

        zip.start_file(name.as_str(), options)?;
        io::copy(&mut BufReader::new(File::open(&path)?), &mut zip)?;
    }

    zip.finish()?.flush()?;
    Ok(())
}

fn collect_files(root: &Path) -> io::Result<Vec<String>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            out.push(entry_name(relative));
        }
    }
    Ok(out)
}

fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn to_system_time(time: DateTime) -> Option<SystemTime> {
    let naive = NaiveDate::from_ymd_opt(time.year().into(), time.month().into(), time.day().into())?
        .and_hms_opt(time.hour().into(), time.minute().into(), time.second().into())?;
    Local.from_local_datetime(&naive).earliest().map(SystemTime::from)
}

fn to_zip_time(time: SystemTime) -> Option<DateTime> {
    let local = chrono::DateTime::<Local>::from(time);
    DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .ok()
}
