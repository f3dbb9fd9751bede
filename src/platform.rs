// Wed Jan 15 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the game binary comes from. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Windows,
    LinuxNative,
    LinuxProton,
    MacOS,
}

impl Platform {
    /// Host platform; Proton is only selected on explicit request.
    pub fn detect(proton: bool) -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if proton {
            Platform::LinuxProton
        } else {
            Platform::LinuxNative
        }
    }

    /// Key of the pattern catalog entry. Proton runs the Windows binary.
    pub fn config_key(&self) -> &'static str {
        match self {
            Platform::Windows | Platform::LinuxProton => "windows",
            Platform::LinuxNative => "linux",
            Platform::MacOS => "macos",
        }
    }

    pub fn uses_windows_binary(&self) -> bool {
        matches!(self, Platform::Windows | Platform::LinuxProton)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::LinuxNative => "linux",
            Platform::LinuxProton => "linux_proton",
            Platform::MacOS => "macos",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" => Ok(Platform::Windows),
            "linux" | "linux_native" => Ok(Platform::LinuxNative),
            "linux_proton" | "proton" => Ok(Platform::LinuxProton),
            "macos" | "mac" => Ok(Platform::MacOS),
            other => Err(format!("Unknown platform: {}", other)),
        }
    }
}
