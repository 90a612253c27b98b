//! Host platform detection for toolchain archive selection
//!
//! Each toolchain release is published as a separate archive per host
//! platform. The platform key feeds into the download URL.

use crate::error::{CorekitError, CorekitResult};
use std::fmt;

/// Host platforms a toolchain archive is published for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostPlatform {
    LinuxX86_64,
    LinuxAarch64,
    MacosX86_64,
    MacosAarch64,
    WindowsX86_64,
}

impl HostPlatform {
    /// Detect the current host platform
    pub fn detect() -> CorekitResult<Self> {
        Self::from_os_arch(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map an (os, arch) pair to a platform key
    pub fn from_os_arch(os: &str, arch: &str) -> CorekitResult<Self> {
        match (os, arch) {
            ("linux", "x86_64") => Ok(Self::LinuxX86_64),
            ("linux", "aarch64") => Ok(Self::LinuxAarch64),
            ("macos", "x86_64") => Ok(Self::MacosX86_64),
            ("macos", "aarch64") => Ok(Self::MacosAarch64),
            ("windows", "x86_64") => Ok(Self::WindowsX86_64),
            _ => Err(CorekitError::UnsupportedPlatform(format!("{os} {arch}"))),
        }
    }

    /// Key used in toolchain archive names
    pub fn key(&self) -> &'static str {
        match self {
            Self::LinuxX86_64 => "x86_64-pc-linux-gnu",
            Self::LinuxAarch64 => "aarch64-linux-gnu",
            Self::MacosX86_64 => "x86_64-apple-darwin",
            Self::MacosAarch64 => "aarch64-apple-darwin",
            Self::WindowsX86_64 => "i686-w64-mingw32",
        }
    }

    /// Whether executables on this platform carry an `.exe` suffix
    pub fn is_windows(&self) -> bool {
        matches!(self, Self::WindowsX86_64)
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LinuxX86_64 => "linux-x86_64",
            Self::LinuxAarch64 => "linux-aarch64",
            Self::MacosX86_64 => "macos-x86_64",
            Self::MacosAarch64 => "macos-aarch64",
            Self::WindowsX86_64 => "windows-x86_64",
        };
        write!(f, "{}", name)
    }
}
