// Fri Jan 17 2026 - Alex

pub mod archive;
pub mod encoding;
pub mod error;
pub mod gamestate;
pub mod repair;
pub mod scanner;

pub use archive::{extract, repack, ExtractedEntry, ExtractedSave};
pub use encoding::{TextDocument, TextEncoding};
pub use error::SaveError;
pub use gamestate::{AchievementsEdit, GameStateTextPatcher, GamestateOutcome, IronmanEdit, IronmanMode, MetaOutcome};
pub use repair::{RepairOptions, RepairSummary, SaveRepairer};
pub use scanner::BlockScanner;
