// Tue Jan 13 2026 - Alex

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Memory mapping failed: {0}")]
    Map(std::io::Error),
    #[error("File is empty: {0:?}")]
    Empty(PathBuf),
    #[error("Size mismatch: mapped {mapped} bytes, got {given}")]
    SizeMismatch { mapped: usize, given: usize },
    #[error("Invalid hex data: {0}")]
    Decode(#[from] hex::FromHexError),
}
