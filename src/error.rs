//! Error types for corekit
//!
//! All modules use `CorekitResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for corekit operations
pub type CorekitResult<T> = Result<T, CorekitError>;

/// All errors that can occur in corekit
#[derive(Error, Debug)]
pub enum CorekitError {
    // Platform errors
    #[error("Unsupported platform: {0}. No toolchain archive is published for this host.")]
    UnsupportedPlatform(String),

    // Acquisition errors
    #[error("Download failed for {url}: {reason}")]
    Acquisition { url: String, reason: String },

    // Validation errors
    #[error("Invalid archive {path}: {reason}")]
    Validation { path: PathBuf, reason: String },

    #[error("Checksum mismatch for {name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    // Install errors
    #[error("Failed to install into {path}: {source}")]
    Install {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out waiting for install lock on '{name}' after {timeout_secs}s")]
    LockTimeout { name: String, timeout_secs: u64 },

    // Package errors
    #[error("Package not installed: {name}")]
    PackageNotInstalled { name: String },

    #[error("Core layout incomplete at {path}: {reason}")]
    CoreLayoutInvalid { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Build errors
    #[error("Sketch not found: {0}")]
    SketchNotFound(PathBuf),

    #[error("Compiler not found at {0}")]
    CompilerMissing(PathBuf),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl CorekitError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an acquisition error
    pub fn acquisition(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Acquisition {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a validation error
    pub fn validation(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Acquisition { .. } => {
                Some("Check your network connection and the configured download URL")
            }
            Self::ChecksumMismatch { .. } => {
                Some("The download source may have changed; verify the configured sha256")
            }
            Self::PackageNotInstalled { .. } => Some("Run: corekit install"),
            Self::LockTimeout { .. } => {
                Some("Another corekit process may be installing; retry once it finishes")
            }
            Self::CompilerMissing(_) => Some("Run: corekit install toolchain"),
            _ => None,
        }
    }
}
