//! Configuration schema for corekit
//!
//! Configuration is stored at `~/.config/corekit/config.toml`

use crate::error::CorekitResult;
use crate::provision::{package, HostPlatform, PackageSpec};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache settings
    pub cache: CacheConfig,

    /// Arduino AVR core package
    pub core: CoreConfig,

    /// AVR toolchain package
    pub toolchain: ToolchainConfig,

    /// Sketch build defaults
    pub build: BuildConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Package cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root override; defaults to the per-user data directory
    pub root: Option<PathBuf>,

    /// Seconds to wait on a competing installer before giving up
    pub lock_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: None,
            lock_timeout_secs: 600,
        }
    }
}

/// Arduino AVR core package settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Core version to provision
    pub version: String,

    /// Archive URL override (mirrors)
    pub url: Option<String>,

    /// Expected archive SHA-256, verified before extraction when set
    pub sha256: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: package::DEFAULT_CORE_VERSION.to_string(),
            url: None,
            sha256: None,
        }
    }
}

/// AVR toolchain package settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Toolchain version to provision
    pub version: String,

    /// Archive URL override (mirrors)
    pub url: Option<String>,

    /// Expected archive SHA-256, verified before extraction when set
    pub sha256: Option<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            version: package::DEFAULT_TOOLCHAIN_VERSION.to_string(),
            url: None,
            sha256: None,
        }
    }
}

/// Sketch build defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Board variant directory name (e.g. "standard" for Uno)
    pub variant: String,

    /// Target MCU passed to the compiler
    pub mcu: String,

    /// CPU frequency in Hz
    pub f_cpu: u32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            variant: "standard".to_string(),
            mcu: "atmega328p".to_string(),
            f_cpu: 16_000_000,
        }
    }
}

impl Config {
    /// Package spec for the configured core version
    pub fn core_spec(&self) -> CorekitResult<PackageSpec> {
        let mut spec = match &self.core.url {
            Some(url) => PackageSpec::new(package::CORE_PACKAGE, &self.core.version, url)?,
            None => PackageSpec::avr_core(&self.core.version),
        };
        spec.sha256 = self.core.sha256.clone();
        Ok(spec)
    }

    /// Package spec for the configured toolchain version on `platform`
    pub fn toolchain_spec(&self, platform: HostPlatform) -> CorekitResult<PackageSpec> {
        let mut spec = match &self.toolchain.url {
            Some(url) => {
                PackageSpec::new(package::TOOLCHAIN_PACKAGE, &self.toolchain.version, url)?
            }
            None => PackageSpec::avr_toolchain(&self.toolchain.version, platform),
        };
        spec.sha256 = self.toolchain.sha256.clone();
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[core]"));
        assert!(toml.contains("[toolchain]"));
        assert!(toml.contains("[build]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.core.version, package::DEFAULT_CORE_VERSION);
        assert_eq!(config.build.mcu, "atmega328p");
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [core]
            version = "1.8.3"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.core.version, "1.8.3");
        assert_eq!(config.build.variant, "standard"); // default preserved
    }

    #[test]
    fn core_spec_uses_url_override() {
        let mut config = Config::default();
        config.core.url = Some("https://mirror.local/core-1.8.6.zip".to_string());
        config.core.sha256 = Some("ab".repeat(32));

        let spec = config.core_spec().unwrap();
        assert!(spec.url.contains("mirror.local"));
        assert_eq!(spec.format, crate::provision::ArchiveFormat::Zip);
        assert!(spec.sha256.is_some());
    }

    #[test]
    fn toolchain_spec_default_urls() {
        let config = Config::default();
        let spec = config.toolchain_spec(HostPlatform::LinuxX86_64).unwrap();
        assert!(spec.url.contains("avr-gcc"));
        assert_eq!(spec.version, package::DEFAULT_TOOLCHAIN_VERSION);
    }
}
