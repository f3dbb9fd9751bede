// Wed Jan 15 2026 - Alex

pub mod args;
pub mod commands;
pub mod handler;

pub use args::{Args, Command, InstallArgs, PatchArgs, RepairSaveArgs};
pub use handler::CommandHandler;
