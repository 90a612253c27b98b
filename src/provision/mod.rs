//! Package provisioning
//!
//! Ensures versioned external packages (the Arduino AVR core, the AVR
//! toolchain) are present in the local cache before they are needed,
//! downloading and unpacking them on demand.
//!
//! Cache layout:
//!
//! ```text
//! <cache-root>/
//! ├── <name>/<version>/   # installed package, plus a version marker file
//! ├── .staging/           # in-flight downloads, discarded on failure
//! └── .locks/             # per-package install locks
//! ```
//!
//! A version marker matching the requested version is the sole signal that
//! an entry is complete. Promotion into the final path is a directory
//! rename, so concurrent callers observe either the whole package or none
//! of it, never a half-extracted tree.

pub mod archive;
pub mod fetch;
pub mod lock;
pub mod package;
pub mod platform;

pub use lock::DEFAULT_LOCK_TIMEOUT;
pub use package::{ArchiveFormat, PackageSpec, CORE_PACKAGE, TOOLCHAIN_PACKAGE};
pub use platform::HostPlatform;

use crate::error::{CorekitError, CorekitResult};
use chrono::{DateTime, Utc};
use lock::InstallLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Version marker file written into each installed package directory
const MARKER_FILE: &str = ".corekit.json";

const STAGING_DIR: &str = ".staging";
const LOCKS_DIR: &str = ".locks";

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Marker recording a completed install
#[derive(Debug, Serialize, Deserialize)]
struct Marker {
    version: String,
    installed_at: DateTime<Utc>,
}

impl Marker {
    fn write(install_dir: &Path, version: &str) -> CorekitResult<()> {
        let marker = Marker {
            version: version.to_string(),
            installed_at: Utc::now(),
        };
        let path = install_dir.join(MARKER_FILE);
        let json = serde_json::to_string_pretty(&marker)?;
        fs::write(&path, json).map_err(|e| CorekitError::Install {
            path: path.clone(),
            source: e,
        })
    }

    fn read(install_dir: &Path) -> Option<Marker> {
        let contents = fs::read_to_string(install_dir.join(MARKER_FILE)).ok()?;
        serde_json::from_str(&contents).ok()
    }
}

/// One installed package version, as reported by [`Provisioner::entries`]
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    pub name: String,
    pub version: String,
    pub path: PathBuf,
    pub installed_at: DateTime<Utc>,
    pub size_bytes: u64,
}

/// Provisions versioned packages into a cache directory.
///
/// The cache root is injected at construction so tests and embedders can
/// isolate instances; there is no process-wide cache singleton.
#[derive(Debug, Clone)]
pub struct Provisioner {
    cache_root: PathBuf,
    lock_timeout: Duration,
}

impl Provisioner {
    /// Create a provisioner over the given cache root
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Override how long `ensure_available` waits on a competing installer
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// The cache root directory
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Final install path for a package spec
    pub fn install_dir(&self, spec: &PackageSpec) -> PathBuf {
        self.cache_root.join(&spec.name).join(&spec.version)
    }

    /// Whether a valid install for this exact spec exists
    pub fn is_installed(&self, spec: &PackageSpec) -> bool {
        marker_matches(&self.install_dir(spec), &spec.version)
    }

    /// Installed path if (and only if) a valid entry exists
    pub fn installed_path(&self, spec: &PackageSpec) -> CorekitResult<PathBuf> {
        let dir = self.install_dir(spec);
        if marker_matches(&dir, &spec.version) {
            Ok(dir)
        } else {
            Err(CorekitError::PackageNotInstalled {
                name: spec.name.clone(),
            })
        }
    }

    /// Versions of a package with a valid marker, unordered
    pub fn installed_versions(&self, name: &str) -> Vec<String> {
        let package_dir = self.cache_root.join(name);
        let Ok(read) = fs::read_dir(&package_dir) else {
            return Vec::new();
        };

        read.filter_map(|entry| {
            let entry = entry.ok()?;
            let marker = Marker::read(&entry.path())?;
            let dir_name = entry.file_name().to_string_lossy().to_string();
            (marker.version == dir_name).then_some(marker.version)
        })
        .collect()
    }

    /// Ensure the package described by `spec` is installed, returning its path.
    ///
    /// Fast path: a matching version marker means no network access at all.
    /// Slow path: download into a staging directory, validate, extract, and
    /// atomically promote via rename, writing the marker last. Concurrent
    /// callers serialize on a per-package lock file; the loser re-checks the
    /// marker and reuses the winner's install.
    ///
    /// `progress` receives `(downloaded_bytes, total_bytes)` during download.
    pub fn ensure_available(
        &self,
        spec: &PackageSpec,
        mut progress: impl FnMut(u64, Option<u64>),
    ) -> CorekitResult<PathBuf> {
        let install_dir = self.install_dir(spec);

        if marker_matches(&install_dir, &spec.version) {
            debug!(package = %spec, "Cache hit, no provisioning needed");
            return Ok(install_dir);
        }

        let _lock = InstallLock::acquire(
            &self.cache_root.join(LOCKS_DIR),
            &spec.name,
            self.lock_timeout,
        )?;

        // A competing installer may have finished while we waited
        if marker_matches(&install_dir, &spec.version) {
            debug!(package = %spec, "Another process completed the install");
            return Ok(install_dir);
        }

        info!(package = %spec, url = %spec.url, "Provisioning package");

        let staging = StagingDir::create(&self.cache_root.join(STAGING_DIR), spec)?;

        let archive_path = staging
            .path()
            .join(format!("package.{}", spec.format.extension()));
        fetch::download(&spec.url, &archive_path, &mut progress)?;

        if let Some(expected) = &spec.sha256 {
            fetch::verify_sha256(&archive_path, &spec.name, expected)?;
        }
        archive::validate(&archive_path, spec.format)?;

        let unpack_dir = staging.path().join("unpacked");
        fs::create_dir_all(&unpack_dir)
            .map_err(|e| CorekitError::io(format!("creating {}", unpack_dir.display()), e))?;
        archive::unpack(&archive_path, spec.format, &unpack_dir)?;
        let content_root = archive::locate_root(&unpack_dir)?;

        // Replace a stale or partial entry for this exact version
        if install_dir.exists() {
            warn!(package = %spec, "Replacing stale cache entry");
            fs::remove_dir_all(&install_dir).map_err(|e| CorekitError::Install {
                path: install_dir.clone(),
                source: e,
            })?;
        }

        if let Some(parent) = install_dir.parent() {
            fs::create_dir_all(parent).map_err(|e| CorekitError::Install {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        // Promotion: the rename makes the whole tree visible at once
        fs::rename(&content_root, &install_dir).map_err(|e| CorekitError::Install {
            path: install_dir.clone(),
            source: e,
        })?;

        // Marker last: its presence is what marks the entry complete
        Marker::write(&install_dir, &spec.version)?;

        info!(package = %spec, path = %install_dir.display(), "Package installed");
        Ok(install_dir)
    }

    /// Remove one installed version. Returns whether anything was removed.
    pub fn remove(&self, spec: &PackageSpec) -> CorekitResult<bool> {
        let dir = self.install_dir(spec);
        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)
            .map_err(|e| CorekitError::io(format!("removing {}", dir.display()), e))?;
        info!(package = %spec, "Removed cache entry");
        Ok(true)
    }

    /// Remove all versions of one package. Returns whether anything was removed.
    pub fn clear_package(&self, name: &str) -> CorekitResult<bool> {
        let dir = self.cache_root.join(name);
        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)
            .map_err(|e| CorekitError::io(format!("removing {}", dir.display()), e))?;
        info!(package = name, "Cleared package cache");
        Ok(true)
    }

    /// Remove the entire cache root, including staging and lock leftovers.
    pub fn clear_all(&self) -> CorekitResult<()> {
        if self.cache_root.exists() {
            fs::remove_dir_all(&self.cache_root).map_err(|e| {
                CorekitError::io(format!("removing {}", self.cache_root.display()), e)
            })?;
        }
        info!(root = %self.cache_root.display(), "Cleared cache root");
        Ok(())
    }

    /// List all valid installed entries across packages
    pub fn entries(&self) -> CorekitResult<Vec<CacheEntry>> {
        let mut entries = Vec::new();
        let Ok(read) = fs::read_dir(&self.cache_root) else {
            return Ok(entries);
        };

        for package in read {
            let package =
                package.map_err(|e| CorekitError::io("reading cache root".to_string(), e))?;
            let name = package.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || !package.path().is_dir() {
                continue;
            }

            for version in self.installed_versions(&name) {
                let path = self.cache_root.join(&name).join(&version);
                let Some(marker) = Marker::read(&path) else {
                    continue;
                };
                entries.push(CacheEntry {
                    name: name.clone(),
                    version,
                    size_bytes: dir_size(&path),
                    installed_at: marker.installed_at,
                    path,
                });
            }
        }

        entries.sort_by(|a, b| (&a.name, &a.version).cmp(&(&b.name, &b.version)));
        Ok(entries)
    }
}

fn marker_matches(install_dir: &Path, version: &str) -> bool {
    Marker::read(install_dir).is_some_and(|m| m.version == version)
}

/// Recursive size of a directory in bytes; unreadable entries count as zero
fn dir_size(path: &Path) -> u64 {
    let Ok(read) = fs::read_dir(path) else {
        return 0;
    };
    read.filter_map(|e| e.ok())
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                dir_size(&path)
            } else {
                entry.metadata().map(|m| m.len()).unwrap_or(0)
            }
        })
        .sum()
}

/// Uniquely named staging directory, removed on drop unless promoted away
struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    fn create(staging_root: &Path, spec: &PackageSpec) -> CorekitResult<Self> {
        let unique = format!(
            "{}-{}-{}-{}",
            spec.name,
            spec.version,
            std::process::id(),
            STAGING_SEQ.fetch_add(1, Ordering::Relaxed)
        );
        let path = staging_root.join(unique);
        fs::create_dir_all(&path)
            .map_err(|e| CorekitError::io(format!("creating staging dir {}", path.display()), e))?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to discard staging dir");
            }
        }
    }
}
