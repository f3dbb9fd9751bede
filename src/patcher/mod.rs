// Thu Jan 16 2026 - Alex

pub mod applier;
pub mod backup;
pub mod error;
pub mod oracle;

pub use applier::{resolve_target, BinaryPatchApplier, PatchResults};
pub use backup::{backup_path, create_backup, BackupPolicy, BackupStatus};
pub use error::PatchError;
pub use oracle::{PatchState, PatchStateOracle};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::catalog::PatchPattern;

    const UNPATCHED: &str = "90909090488B1248AABBCCDDEEFF001122334485C0C3C3C7400C7490";
    const PATCHED: &str = "90909090488B1248AABBCCDDEEFF001122334433C0C3C3C7400CEB90";

    pub fn patch_a() -> PatchPattern {
        PatchPattern::new("488B1248.{20,26}%s", "85C0", "33C0").with_display_name("Achievements")
    }

    pub fn patch_b() -> PatchPattern {
        PatchPattern::new("C7400C%s", "74", "EB").with_display_name("Checksum")
    }

    pub fn unpatched_fixture() -> Vec<u8> {
        hex::decode(UNPATCHED).unwrap()
    }

    /// Both patches applied.
    pub fn patched_fixture() -> Vec<u8> {
        hex::decode(PATCHED).unwrap()
    }
}
