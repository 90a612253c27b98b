//! Archive download and checksum verification
//!
//! Downloads are blocking and chunked so callers can surface byte-level
//! progress. No retry policy lives here; a failed download is reported to
//! the caller, who decides whether to try again.

use crate::error::{CorekitError, CorekitResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("corekit/", env!("CARGO_PKG_VERSION"));

const CHUNK_SIZE: usize = 8192;

/// Download `url` into `dest`, reporting `(downloaded, total)` after each chunk.
///
/// `total` is taken from the Content-Length header when the server sends one.
pub fn download(
    url: &str,
    dest: &Path,
    progress: &mut dyn FnMut(u64, Option<u64>),
) -> CorekitResult<()> {
    info!(url, dest = %dest.display(), "Downloading archive");

    let response = ureq::get(url)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "*/*")
        .call()
        .map_err(|e| CorekitError::acquisition(url, e.to_string()))?;

    let total: Option<u64> = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok());

    let mut reader = response.into_body().into_reader();
    let mut file = File::create(dest)
        .map_err(|e| CorekitError::io(format!("creating {}", dest.display()), e))?;

    let mut downloaded: u64 = 0;
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| CorekitError::acquisition(url, format!("read failed: {e}")))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .map_err(|e| CorekitError::io(format!("writing {}", dest.display()), e))?;
        downloaded += n as u64;
        progress(downloaded, total);
    }

    // A Content-Length that the body fell short of means a truncated transfer
    if let Some(expected) = total {
        if downloaded < expected {
            return Err(CorekitError::acquisition(
                url,
                format!("truncated transfer: got {downloaded} of {expected} bytes"),
            ));
        }
    }

    debug!(url, bytes = downloaded, "Download complete");
    Ok(())
}

/// Verify the SHA-256 of a downloaded archive against an expected hex digest.
pub fn verify_sha256(path: &Path, name: &str, expected: &str) -> CorekitResult<()> {
    let mut file = File::open(path)
        .map_err(|e| CorekitError::io(format!("opening {}", path.display()), e))?;

    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| CorekitError::io(format!("reading {}", path.display()), e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let actual = hex::encode(hasher.finalize());
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(CorekitError::ChecksumMismatch {
            name: name.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }

    debug!(name, sha256 = %actual, "Checksum verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn sha256_accepts_matching_digest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pkg.tar.gz");
        fs::write(&path, b"archive bytes").unwrap();

        let digest = hex::encode(Sha256::digest(b"archive bytes"));
        verify_sha256(&path, "pkg", &digest).unwrap();

        // Case-insensitive comparison
        verify_sha256(&path, "pkg", &digest.to_uppercase()).unwrap();
    }

    #[test]
    fn sha256_rejects_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pkg.tar.gz");
        fs::write(&path, b"archive bytes").unwrap();

        let wrong = hex::encode(Sha256::digest(b"other bytes"));
        let err = verify_sha256(&path, "pkg", &wrong).unwrap_err();
        assert!(matches!(err, CorekitError::ChecksumMismatch { .. }));
    }

    #[test]
    fn download_unreachable_host_is_acquisition_error() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("pkg.tar.gz");

        // Nothing listens on port 1, so the connection is refused
        let err = download("http://127.0.0.1:1/pkg.tar.gz", &dest, &mut |_, _| {}).unwrap_err();
        assert!(matches!(err, CorekitError::Acquisition { .. }));
    }
}
