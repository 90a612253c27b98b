//! Advisory install locks
//!
//! One lock file per package name serializes first-time installs across
//! processes and threads. The lock is a `create_new` file holding
//! `pid:timestamp`; the guard removes it on drop. Locks older than the
//! stale threshold are treated as abandoned and broken.

use crate::error::{CorekitError, CorekitResult};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Default time to wait for a competing installer before giving up
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(600);

/// Locks older than this are considered abandoned (crashed holder)
const STALE_THRESHOLD: Duration = Duration::from_secs(900);

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Guard for an acquired install lock; releases the lock file on drop
#[derive(Debug)]
pub struct InstallLock {
    path: PathBuf,
    name: String,
}

impl InstallLock {
    /// Acquire the install lock for `name`, blocking up to `timeout`.
    ///
    /// Polls while another process holds the lock, breaking locks whose
    /// recorded timestamp is older than the stale threshold.
    pub fn acquire(lock_dir: &Path, name: &str, timeout: Duration) -> CorekitResult<Self> {
        fs::create_dir_all(lock_dir)
            .map_err(|e| CorekitError::io(format!("creating lock directory {}", lock_dir.display()), e))?;

        let path = lock_dir.join(format!("{name}.lock"));
        let start = Instant::now();

        loop {
            match try_create(&path) {
                Ok(()) => {
                    debug!(package = name, "Acquired install lock");
                    return Ok(Self {
                        path,
                        name: name.to_string(),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if let Some(age) = holder_age(&path) {
                        if age > STALE_THRESHOLD {
                            warn!(
                                package = name,
                                age_secs = age.as_secs(),
                                "Breaking stale install lock"
                            );
                            let _ = fs::remove_file(&path);
                            continue;
                        }
                    } else {
                        // Unreadable lock file, treat as invalid
                        let _ = fs::remove_file(&path);
                        continue;
                    }

                    if start.elapsed() >= timeout {
                        return Err(CorekitError::LockTimeout {
                            name: name.to_string(),
                            timeout_secs: timeout.as_secs(),
                        });
                    }

                    debug!(package = name, "Install lock held by another process, waiting");
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(CorekitError::io(
                        format!("creating lock file {}", path.display()),
                        e,
                    ))
                }
            }
        }
    }

    /// Package name this lock covers
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(package = %self.name, error = %e, "Failed to release install lock");
            }
        } else {
            debug!(package = %self.name, "Released install lock");
        }
    }
}

fn try_create(path: &Path) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let stamp = format!("{}:{}", std::process::id(), unix_now());
    file.write_all(stamp.as_bytes())
}

/// Age of the lock according to the timestamp recorded by its holder
fn holder_age(path: &Path) -> Option<Duration> {
    let contents = fs::read_to_string(path).ok()?;
    let (_pid, acquired_at) = contents.split_once(':')?;
    let acquired_at: u64 = acquired_at.trim().parse().ok()?;
    Some(Duration::from_secs(unix_now().saturating_sub(acquired_at)))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn acquire_and_release() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("avr-gcc.lock");

        {
            let lock = InstallLock::acquire(dir.path(), "avr-gcc", Duration::from_secs(1)).unwrap();
            assert_eq!(lock.name(), "avr-gcc");
            assert!(lock_path.exists());
        }

        // Released on drop
        assert!(!lock_path.exists());
    }

    #[test]
    fn second_acquire_times_out() {
        let dir = TempDir::new().unwrap();
        let _held = InstallLock::acquire(dir.path(), "core", Duration::from_secs(5)).unwrap();

        let result = InstallLock::acquire(dir.path(), "core", Duration::from_millis(100));
        assert!(matches!(result, Err(CorekitError::LockTimeout { .. })));
    }

    #[test]
    fn different_names_do_not_contend() {
        let dir = TempDir::new().unwrap();
        let _a = InstallLock::acquire(dir.path(), "core", Duration::from_secs(1)).unwrap();
        let _b = InstallLock::acquire(dir.path(), "toolchain", Duration::from_secs(1)).unwrap();
    }

    #[test]
    fn stale_lock_is_broken() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("core.lock");

        // Forge a lock acquired well past the stale threshold
        let old = unix_now() - STALE_THRESHOLD.as_secs() - 60;
        fs::write(&path, format!("999999:{old}")).unwrap();

        let lock = InstallLock::acquire(dir.path(), "core", Duration::from_millis(500)).unwrap();
        assert_eq!(lock.name(), "core");
    }

    #[test]
    fn garbage_lock_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("core.lock");
        fs::write(&path, "not a lock stamp").unwrap();

        let _lock = InstallLock::acquire(dir.path(), "core", Duration::from_millis(500)).unwrap();
    }
}
