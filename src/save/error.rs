// Fri Jan 17 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Not a recognized save structure: {0}")]
    Structure(String),
    #[error("Cannot encode text: {0}")]
    Encoding(String),
    #[error("Achievements block unavailable")]
    AchievementsUnavailable,
    #[error("Save archive has no '{0}' entry")]
    MissingEntry(String),
}
