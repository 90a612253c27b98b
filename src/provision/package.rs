//! Package specifications for provisionable packages
//!
//! A `PackageSpec` pins everything `ensure_available` needs: the package
//! name, the exact version, the archive URL, and the container format.
//! Versions are fixed at process start from configuration and never change
//! during a run.

use crate::error::{CorekitError, CorekitResult};
use crate::provision::platform::HostPlatform;
use std::fmt;

/// Package name for the Arduino AVR core sources
pub const CORE_PACKAGE: &str = "arduino-avr-core";

/// Package name for the AVR cross-toolchain
pub const TOOLCHAIN_PACKAGE: &str = "avr-gcc";

/// Default Arduino AVR core version (stable, compatible with most sketches)
pub const DEFAULT_CORE_VERSION: &str = "1.8.6";

/// Default AVR toolchain version
pub const DEFAULT_TOOLCHAIN_VERSION: &str = "7.3.0-atmel3.6.1-arduino7";

const CORE_URL_BASE: &str = "https://github.com/arduino/ArduinoCore-avr/archive/refs/tags";
const TOOLCHAIN_URL_BASE: &str = "https://downloads.arduino.cc/tools";

/// Supported archive container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// gzip-compressed tarball
    TarGz,
    /// zip archive
    Zip,
}

impl ArchiveFormat {
    /// Guess the format from a URL or file name
    pub fn from_url(url: &str) -> Option<Self> {
        if url.ends_with(".tar.gz") || url.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if url.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }

    /// File extension used for staged downloads
    pub fn extension(&self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Everything needed to provision one versioned package
#[derive(Debug, Clone)]
pub struct PackageSpec {
    /// Cache directory name (e.g. "arduino-avr-core")
    pub name: String,
    /// Exact version to install
    pub version: String,
    /// Archive download URL
    pub url: String,
    /// Expected archive container format
    pub format: ArchiveFormat,
    /// Optional SHA-256 of the archive, verified before extraction
    pub sha256: Option<String>,
}

impl PackageSpec {
    /// Build a spec from explicit parts, inferring the format from the URL
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        url: impl Into<String>,
    ) -> CorekitResult<Self> {
        let url = url.into();
        let format = ArchiveFormat::from_url(&url).ok_or_else(|| {
            CorekitError::User(format!(
                "Unsupported archive format in URL: {url} (expected .tar.gz or .zip)"
            ))
        })?;
        Ok(Self {
            name: name.into(),
            version: version.into(),
            url,
            format,
            sha256: None,
        })
    }

    /// Attach an expected archive checksum
    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }

    /// Spec for the Arduino AVR core sources at the given version.
    ///
    /// GitHub tag tarballs extract to a single `ArduinoCore-avr-<version>/`
    /// root, which promotion strips.
    pub fn avr_core(version: &str) -> Self {
        Self {
            name: CORE_PACKAGE.to_string(),
            version: version.to_string(),
            url: format!("{CORE_URL_BASE}/{version}.tar.gz"),
            format: ArchiveFormat::TarGz,
            sha256: None,
        }
    }

    /// Spec for the AVR toolchain at the given version on the given host.
    ///
    /// Windows archives are zips; other hosts use tarballs. The URL can be
    /// overridden per-operator in configuration when a mirror is required.
    pub fn avr_toolchain(version: &str, platform: HostPlatform) -> Self {
        let (ext, format) = if platform.is_windows() {
            ("zip", ArchiveFormat::Zip)
        } else {
            ("tar.gz", ArchiveFormat::TarGz)
        };
        Self {
            name: TOOLCHAIN_PACKAGE.to_string(),
            version: version.to_string(),
            url: format!(
                "{TOOLCHAIN_URL_BASE}/avr-gcc-{version}-{key}.{ext}",
                key = platform.key()
            ),
            format,
            sha256: None,
        }
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}
