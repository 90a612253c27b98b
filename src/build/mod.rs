//! Compile collaborator over provisioned packages
//!
//! Resolves compiler binaries and core source layout under the paths
//! returned by the provisioner, and drives sketch compilation. Nothing
//! here downloads anything; callers run `ensure_available` first.

pub mod compile;

pub use compile::{BuildArtifacts, BuildOptions, SketchBuilder};

use crate::error::{CorekitError, CorekitResult};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Resolves binaries inside a provisioned AVR toolchain
#[derive(Debug, Clone)]
pub struct Toolchain {
    root: PathBuf,
}

impl Toolchain {
    /// Wrap an installed toolchain root (as returned by the provisioner)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The toolchain install root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to `avr-gcc`
    pub fn gcc(&self) -> PathBuf {
        self.tool("avr-gcc")
    }

    /// Path to `avr-g++`
    pub fn gpp(&self) -> PathBuf {
        self.tool("avr-g++")
    }

    /// Path to `avr-objcopy`
    pub fn objcopy(&self) -> PathBuf {
        self.tool("avr-objcopy")
    }

    /// Path to `avr-size`
    pub fn size_tool(&self) -> PathBuf {
        self.tool("avr-size")
    }

    /// Fail unless the compiler binary is present
    pub fn require(&self) -> CorekitResult<()> {
        let gcc = self.gcc();
        if gcc.exists() {
            Ok(())
        } else {
            Err(CorekitError::CompilerMissing(gcc))
        }
    }

    /// First line of `avr-gcc --version`, e.g. "avr-gcc (GCC) 7.3.0"
    pub async fn version(&self) -> CorekitResult<String> {
        let gcc = self.gcc();
        let output = Command::new(&gcc)
            .arg("--version")
            .output()
            .await
            .map_err(|e| CorekitError::command_failed(gcc.display().to_string(), e))?;

        if !output.status.success() {
            return Err(CorekitError::command_exec(
                format!("{} --version", gcc.display()),
                String::from_utf8_lossy(&output.stderr),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().to_string())
    }

    fn tool(&self, name: &str) -> PathBuf {
        self.root
            .join("bin")
            .join(format!("{name}{}", std::env::consts::EXE_SUFFIX))
    }
}

/// Resolves directories and sources inside a provisioned Arduino core
#[derive(Debug, Clone)]
pub struct CoreLayout {
    root: PathBuf,
}

impl CoreLayout {
    /// Wrap an installed core root (as returned by the provisioner)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The core install root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the core sources and `Arduino.h`
    pub fn core_dir(&self) -> PathBuf {
        self.root.join("cores").join("arduino")
    }

    /// Board variant directory (e.g. "standard" for the Uno)
    pub fn variant_dir(&self, variant: &str) -> PathBuf {
        self.root.join("variants").join(variant)
    }

    /// Fail unless the layout contains the core API header
    pub fn validate(&self) -> CorekitResult<()> {
        let arduino_h = self.core_dir().join("Arduino.h");
        if arduino_h.exists() {
            Ok(())
        } else {
            Err(CorekitError::CoreLayoutInvalid {
                path: self.root.clone(),
                reason: "cores/arduino/Arduino.h missing".to_string(),
            })
        }
    }

    /// All core sources that must be compiled (.c, .cpp, .S), sorted
    pub fn sources(&self) -> CorekitResult<Vec<PathBuf>> {
        let core_dir = self.core_dir();
        let read = std::fs::read_dir(&core_dir)
            .map_err(|e| CorekitError::io(format!("reading {}", core_dir.display()), e))?;

        let mut sources: Vec<PathBuf> = read
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("c" | "cpp" | "S")
                )
            })
            .collect();

        sources.sort();
        debug!(count = sources.len(), "Collected core sources");
        Ok(sources)
    }
}
