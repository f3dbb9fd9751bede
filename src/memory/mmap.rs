// Tue Jan 13 2026 - Alex

use crate::memory::MemoryError;
use memmap2::{Mmap, MmapMut};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// A target binary mapped read/write for in-place patching.
pub struct MappedFile {
    mmap: MmapMut,
    writes: usize,
}

impl MappedFile {
    pub fn open_rw<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| MemoryError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        ensure_not_empty(&file, path)?;

        let mmap = unsafe { MmapMut::map_mut(&file) }.map_err(MemoryError::Map)?;

        Ok(Self { mmap, writes: 0 })
    }

    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_ref()
    }

    /// Replaces the whole mapped region and flushes it to disk.
    pub fn write_all(&mut self, data: &[u8]) -> Result<(), MemoryError> {
        if data.len() != self.mmap.len() {
            return Err(MemoryError::SizeMismatch {
                mapped: self.mmap.len(),
                given: data.len(),
            });
        }

        self.mmap.copy_from_slice(data);
        self.mmap.flush()?;
        self.writes += 1;
        Ok(())
    }

    /// Number of flushed writes issued through this mapping.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

pub fn map_readonly<P: AsRef<Path>>(path: P) -> Result<Mmap, MemoryError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| MemoryError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    ensure_not_empty(&file, path)?;

    unsafe { Mmap::map(&file) }.map_err(MemoryError::Map)
}

fn ensure_not_empty(file: &File, path: &Path) -> Result<(), MemoryError> {
    if file.metadata()?.len() == 0 {
        return Err(MemoryError::Empty(path.to_path_buf()));
    }
    Ok(())
}
