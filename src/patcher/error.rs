// Thu Jan 16 2026 - Alex

use crate::memory::MemoryError;
use crate::pattern::PatternError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Cannot access {path:?}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: MemoryError,
    },
    #[error("Backup of {path:?} failed: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Pattern for '{name}' not found. The binary may already be patched or be a different game version")]
    NoMatch { name: String },
    #[error("Invalid pattern for '{name}': {source}")]
    Pattern {
        name: String,
        #[source]
        source: PatternError,
    },
    #[error("Hashing {path:?} failed: {source}")]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Memory(#[from] MemoryError),
}
